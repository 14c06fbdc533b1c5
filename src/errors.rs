use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("provider error: {0:#}")]
    Provider(#[from] anyhow::Error),

    #[error("{0}")]
    Failed(&'static str),
}

impl AppError {
    /// Swaps internal failures for `message` so provider details never reach
    /// the client. Errors the caller can act on pass through.
    pub fn or_generic(self, message: &'static str) -> Self {
        match self {
            AppError::Config(_) | AppError::Provider(_) => {
                tracing::error!(error = %self, "{message}");
                AppError::Failed(message)
            }
            other => other,
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::NotFound(_) => "not found".to_string(),
            AppError::Unauthorized => "unauthorized".to_string(),
            AppError::Failed(msg) => msg.to_string(),
            AppError::Config(_) | AppError::Provider(_) => "internal error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Provider(_) => StatusCode::BAD_GATEWAY,
            AppError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({ "error": self.public_message() });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_or_generic_hides_provider_details() {
        let err = AppError::Provider(anyhow::anyhow!("Graph API error (500): secret stack"));
        let generic = err.or_generic("Could not create booking. Please try again.");
        assert!(matches!(generic, AppError::Failed(_)));
        assert_eq!(
            generic.public_message(),
            "Could not create booking. Please try again."
        );
    }

    #[test]
    fn test_or_generic_keeps_validation() {
        let err = AppError::Validation("First name, last name, and email are required".into());
        let kept = err.or_generic("Could not create booking. Please try again.");
        assert_eq!(
            kept.public_message(),
            "First name, last name, and email are required"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflict("taken".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Provider(anyhow::anyhow!("boom")).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
