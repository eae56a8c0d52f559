use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rally_core::error::CoreError;
use rally_core::resolver::ResolveError;
use rally_core::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps domain errors and adds HTTP-specific variants. Implements
/// [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `rally_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A page resolution failure (missing creator or store failure).
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A data-store failure outside page resolution.
    #[error("Data store error: {0}")]
    Store(#[from] StoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Resolution errors ---
            AppError::Resolve(ResolveError::MissingCreator { code, user_id }) => {
                tracing::error!(code = %code, user_id, "Page references a missing creator");
                internal()
            }
            AppError::Resolve(ResolveError::Store(err)) | AppError::Store(err) => {
                tracing::error!(error = %err, "Data store error");
                internal()
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
