use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use khata_core::DomainError;
use khata_store::StoreError;

/// Map a store/domain outcome to the HTTP error envelope.
///
/// Backend faults are logged in full and reported opaquely.
pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(DomainError::InvalidInput(msg)) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_input", msg)
        }
        StoreError::Domain(DomainError::Unauthorized) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "unauthorized")
        }
        StoreError::Domain(DomainError::NotFound) => {
            json_error(StatusCode::NOT_FOUND, "not_found", "not found")
        }
        StoreError::Domain(DomainError::Conflict(msg)) => {
            json_error(StatusCode::CONFLICT, "conflict", msg)
        }
        StoreError::Backend { operation, message } => {
            tracing::error!(operation, message, "store backend error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            )
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
