use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use pulse_types::envelope::Envelope;

/// Single error taxonomy for every handler. All variants surface directly to
/// the caller as an envelope with a null payload; unexpected failures collapse
/// into `Internal` and render a generic message with details logged server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("permission denied")]
    Forbidden,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        ApiError::Conflict(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            error!("internal error: {:#}", e);
        }

        let status = self.status_code();
        let body = Envelope::<()>::error(status.as_u16(), self.to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::validation("bad").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("report").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::conflict("taken").status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_internal_message_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.3"));
        // details must never leak to the caller
        assert_eq!(err.to_string(), "internal server error");
    }

    #[test]
    fn test_not_found_names_the_resource() {
        assert_eq!(ApiError::NotFound("hospital").to_string(), "hospital not found");
    }
}
