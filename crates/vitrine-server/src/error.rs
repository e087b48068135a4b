use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use vitrine_store::StoreError;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failure; the detail is logged, not leaked to callers.
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmptyBody | StoreError::BodyTooLarge | StoreError::SelfMessage => {
                ServerError::BadRequest(err.to_string())
            }
            StoreError::NotRecipient => ServerError::Forbidden(err.to_string()),
            StoreError::NotFound => ServerError::NotFound("Record not found".to_string()),
            StoreError::UnknownUser(id) => ServerError::NotFound(format!("Unknown user: {id}")),
            other => ServerError::Storage(other),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ServerError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ServerError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_client_statuses() {
        assert!(matches!(
            ServerError::from(StoreError::EmptyBody),
            ServerError::BadRequest(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::NotRecipient),
            ServerError::Forbidden(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::NotFound),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            ServerError::from(StoreError::NoDataDir),
            ServerError::Storage(_)
        ));
    }
}
