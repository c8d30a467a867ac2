use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tillpoint_core::DomainError;

/// Map a domain error to its JSON response.
///
/// Report errors arrive here through `From<ReportError> for DomainError`.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound(_) => {
            json_error(StatusCode::NOT_FOUND, "not_found", err.to_string())
        }
        DomainError::Validation(msg)
        | DomainError::InvalidId(msg)
        | DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_query", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tillpoint_core::CategoryId;
    use tillpoint_reporting::ReportError;

    #[test]
    fn missing_filter_entity_is_not_found() {
        let err: DomainError = ReportError::CategoryNotFound(CategoryId::new()).into();
        let res = domain_error_to_response(err);
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn malformed_input_is_bad_request() {
        let res = domain_error_to_response(DomainError::invalid_id("abc"));
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
