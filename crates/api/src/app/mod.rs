//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: shared state (inventory and sales readers, order relay, defaults)
//! - `routes/`: HTTP handlers, one file per area
//! - `dto.rs`: query parsing into report filters and windows
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, _) = get_json(build_app(AppServices::default()), "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_store_yields_empty_reports() {
        let app = build_app(AppServices::default());

        let (status, body) = get_json(app.clone(), "/reports/inventory/stock-taking").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_products"], 0);
        assert_eq!(body["items"], serde_json::json!([]));

        let (status, body) = get_json(app.clone(), "/reports/inventory").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock_alerts"]["out_of_stock_count"], 0);
        assert_eq!(body["stock_movement"]["summary"]["total_movements"], 0);

        let (status, body) = get_json(app, "/reports/sales/payment-methods").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totals"]["transaction_count"], 0);
        assert_eq!(body["payment_methods"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn malformed_filters_are_bad_requests() {
        let app = build_app(AppServices::default());

        let (status, body) =
            get_json(app.clone(), "/reports/inventory/stock-movement?product_id=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_query");

        let (status, _) =
            get_json(app.clone(), "/reports/inventory/stock-adjustment?status=lost").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(app, "/reports/inventory/stock-taking?period=fortnight").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
