use axum::{
    Router,
    routing::{get, post},
};

pub mod orders;
pub mod reports;
pub mod sales;
pub mod system;

/// Router for every endpoint except `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/reports/inventory", get(reports::inventory_bundle))
        .route("/reports/inventory/stock-alerts", get(reports::stock_alerts))
        .route("/reports/inventory/stock-taking", get(reports::stock_taking))
        .route("/reports/inventory/stock-movement", get(reports::stock_movement))
        .route("/reports/inventory/stock-adjustment", get(reports::stock_adjustment))
        .route("/reports/sales", get(sales::sales_bundle))
        .route("/reports/sales/summary", get(sales::sales_summary))
        .route("/reports/sales/by-category", get(sales::sales_by_category))
        .route("/reports/sales/by-product", get(sales::sales_by_product))
        .route("/reports/sales/payment-methods", get(sales::payment_methods))
        .route("/ws/orders", get(orders::orders_ws))
        .route("/orders/events", post(orders::publish_event))
}
