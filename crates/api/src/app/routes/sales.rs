//! Sales report endpoints.
//!
//! Every endpoint accepts `period`/`start`/`end` and an optional `branch_id`.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    response::IntoResponse,
};
use chrono::Utc;

use tillpoint_core::{BranchId, DomainResult, ReportWindow};

use crate::app::dto::ReportQuery;
use crate::app::errors;
use crate::app::services::AppServices;

fn scope(query: &ReportQuery) -> DomainResult<(ReportWindow, Option<BranchId>)> {
    Ok((query.window(Utc::now())?, query.branch_id()?))
}

pub async fn sales_bundle(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, branch_id) = match scope(&query) {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.sales_reports(window, branch_id).generate_all() {
        Ok(bundle) => Json(bundle).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn sales_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let ((window, branch_id), group_by) =
        match scope(&query).and_then(|s| Ok((s, query.grouping()?))) {
            Ok(parsed) => parsed,
            Err(e) => return errors::domain_error_to_response(e),
        };

    match services.sales_reports(window, branch_id).sales_summary(group_by) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn sales_by_category(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, branch_id) = match scope(&query) {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.sales_reports(window, branch_id).sales_by_category() {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn sales_by_product(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let ((window, branch_id), filter) =
        match scope(&query).and_then(|s| Ok((s, query.product_sales_filter()?))) {
            Ok(parsed) => parsed,
            Err(e) => return errors::domain_error_to_response(e),
        };

    match services.sales_reports(window, branch_id).sales_by_product(&filter) {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}

pub async fn payment_methods(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ReportQuery>,
) -> axum::response::Response {
    let (window, branch_id) = match scope(&query) {
        Ok(parsed) => parsed,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.sales_reports(window, branch_id).payment_methods() {
        Ok(report) => Json(report).into_response(),
        Err(e) => errors::domain_error_to_response(e.into()),
    }
}
