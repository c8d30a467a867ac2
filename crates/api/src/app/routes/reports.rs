use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};
use chrono::Utc;

use tillpoint_core::ReportWindow;

use crate::app::dto::ReportQuery;
use crate::app::errors;
use crate::app::services::AppServices;

pub async fn inventory_bundle(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let window = match query.window(Utc::now()) {
        Ok(w) => w,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.reports(window).generate_all() {
        Ok(bundle) => Json(bundle).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn stock_alerts(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let threshold = match query.threshold() {
        Ok(t) => t.unwrap_or(services.alert_threshold),
        Err(e) => return errors::domain_error_to_response(e),
    };

    let report = services.reports(ReportWindow::open()).stock_alerts(threshold);
    Json(report).into_response()
}

pub async fn stock_taking(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, filter) = match query
        .window(Utc::now())
        .and_then(|w| Ok((w, query.stock_taking_filter()?)))
    {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.reports(window).stock_taking(&filter) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn stock_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, filter) = match query
        .window(Utc::now())
        .and_then(|w| Ok((w, query.movement_filter()?)))
    {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.reports(window).stock_movement(&filter) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn stock_adjustment(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, filter) = match query
        .window(Utc::now())
        .and_then(|w| Ok((w, query.adjustment_filter()?)))
    {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.reports(window).stock_adjustment(&filter) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}
