//! Report generation over persisted back-office state.
//!
//! Reports are read-only projections: each one is a single pass over an
//! `InventoryReader` (and a `SalesReader` for sales), reduced in memory into a
//! serializable structure that a renderer (PDF templates, JSON API) consumes
//! as-is.

pub mod error;
pub mod inventory;
pub mod sales;

pub use error::{ReportError, ReportResult};
pub use inventory::{
    DEFAULT_ALERT_THRESHOLD, InventoryReportBundle, InventoryReportGenerator,
    adjustment::{
        AdjustmentSummary, StockAdjustmentFilter, StockAdjustmentReport, StockAdjustmentRow,
    },
    alerts::{AlertType, StockAlertReport, StockAlertRow},
    movement::{MovementSummary, StockMovementFilter, StockMovementReport, StockMovementRow},
    stock_taking::{CategorySummary, StockTakingFilter, StockTakingReport, StockTakingRow},
};
pub use sales::{
    SalesReportBundle, SalesReportGenerator,
    category::{CategorySalesRow, CategorySalesTotals, SalesByCategoryReport},
    payment::{PaymentMethodRow, PaymentMethodsReport, PaymentTotals},
    product::{
        DEFAULT_TOP_N, ProductSalesFilter, ProductSalesReport, ProductSalesRow, ProductSalesTotals,
    },
    summary::{SalesBucket, SalesGrouping, SalesMetrics, SalesSummaryReport},
};
