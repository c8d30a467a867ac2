use std::sync::Arc;

use anyhow::Context;
use rust_decimal::Decimal;
use tracing::{info, warn};

use tillpoint_core::{BranchId, ReportWindow};
use tillpoint_events::OrderRelay;
use tillpoint_infra::{AppConfig, PostgresSnapshotLoader};
use tillpoint_inventory::{InMemoryInventoryStore, InventoryReader};
use tillpoint_reporting::{
    DEFAULT_ALERT_THRESHOLD, InventoryReportGenerator, SalesReportGenerator,
};
use tillpoint_sales::{InMemorySalesStore, SalesReader};

/// Shared state handed to every handler.
pub struct AppServices {
    pub inventory: Arc<dyn InventoryReader>,
    pub sales: Arc<dyn SalesReader>,
    pub relay: Arc<OrderRelay>,
    /// Used when a request does not pass `threshold`.
    pub alert_threshold: Decimal,
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryInventoryStore::new()), Arc::new(OrderRelay::default()))
    }
}

impl AppServices {
    pub fn new(inventory: Arc<dyn InventoryReader>, relay: Arc<OrderRelay>) -> Self {
        Self {
            inventory,
            sales: Arc::new(InMemorySalesStore::new()),
            relay,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
        }
    }

    pub fn with_sales(mut self, sales: Arc<dyn SalesReader>) -> Self {
        self.sales = sales;
        self
    }

    pub fn with_alert_threshold(mut self, threshold: Decimal) -> Self {
        self.alert_threshold = threshold;
        self
    }

    pub fn reports(&self, window: ReportWindow) -> InventoryReportGenerator<Arc<dyn InventoryReader>> {
        InventoryReportGenerator::new(self.inventory.clone())
            .with_window(window)
            .with_alert_threshold(self.alert_threshold)
    }

    pub fn sales_reports(
        &self,
        window: ReportWindow,
        branch_id: Option<BranchId>,
    ) -> SalesReportGenerator<Arc<dyn SalesReader>, Arc<dyn InventoryReader>> {
        SalesReportGenerator::new(self.sales.clone(), self.inventory.clone())
            .with_window(window)
            .with_branch(branch_id)
    }
}

/// Wire services from configuration.
///
/// With `DATABASE_URL` set, inventory and orders are loaded from Postgres
/// once at startup; otherwise both stores start empty.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store = InMemoryInventoryStore::new();
    let sales = InMemorySalesStore::new();

    match config.database_url.as_deref() {
        Some(url) => {
            let loader = PostgresSnapshotLoader::connect(url)
                .await
                .context("failed to connect to postgres")?;
            let snapshot = loader
                .load_inventory()
                .await
                .context("failed to load inventory snapshot")?;
            store.load(snapshot);
            let snapshot = loader
                .load_sales()
                .await
                .context("failed to load sales snapshot")?;
            sales.load(snapshot);
        }
        None => warn!("DATABASE_URL not set; serving empty in-memory stores"),
    }

    let relay = Arc::new(OrderRelay::new(config.kds_websockets_enabled));
    info!(
        relay_enabled = config.kds_websockets_enabled,
        alert_threshold = %config.stock_alert_threshold,
        "services ready"
    );

    Ok(AppServices::new(Arc::new(store), relay)
        .with_sales(Arc::new(sales))
        .with_alert_threshold(config.stock_alert_threshold))
}
