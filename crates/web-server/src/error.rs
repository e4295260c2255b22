use analytics::QueryError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("invalid arguments for {tool}: {message}")]
    BadArguments { tool: String, message: String },
    #[error(transparent)]
    Query(#[from] QueryError),
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Store error: {0}")]
    Store(#[from] timeseries::StoreError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownTool(_) => StatusCode::NOT_FOUND,
            AppError::BadArguments { .. } => StatusCode::BAD_REQUEST,
            AppError::Query(QueryError::InvalidArgument(_)) => StatusCode::BAD_REQUEST,
            AppError::Query(QueryError::StoreUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            // The engine settles `NotFound` into its outcomes; it never surfaces here.
            AppError::Query(QueryError::NotFound(_))
            | AppError::Database(_)
            | AppError::Store(_)
            | AppError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::Database(db_err) => {
                tracing::error!(error = ?db_err, "Database error.");
                "An internal database error occurred".to_string()
            }
            AppError::Store(store_err) => {
                tracing::error!(error = ?store_err, "Store error.");
                "The time series store could not be built".to_string()
            }
            AppError::Serialization(err) => {
                tracing::error!(error = ?err, "Serialization error.");
                "The result could not be encoded".to_string()
            }
            other => {
                tracing::debug!(error = %other, %status, "Tool call rejected.");
                other.to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_mistakes_are_client_errors() {
        assert_eq!(AppError::UnknownTool("x".into()).status(), StatusCode::NOT_FOUND);
        let bad = AppError::BadArguments { tool: "x".into(), message: "missing field".into() };
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
        let invalid = AppError::from(QueryError::InvalidArgument("invalid year 12".into()));
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.to_string(), "invalid year 12");
    }

    #[test]
    fn unloaded_store_is_unavailable() {
        let err = AppError::from(QueryError::StoreUnavailable("not loaded".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
