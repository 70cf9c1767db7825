use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Application-level error type. Every variant maps to one HTTP status and a
/// `{ success: false, message }` body; stock and transition errors carry the
/// offending product or order so the operator can see what to fix.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("Insufficient stock for product {product}")]
    InsufficientStock { product: String },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidTransition(_)
            | ApiError::InsufficientStock { .. }
            | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Store faults are logged server-side; the client only sees a
        // generic message.
        let message = match &self {
            ApiError::Database(sqlx::Error::RowNotFound) => "Not found".to_string(),
            ApiError::Database(e) => {
                log::error!("database error: {}", e);
                "Server error".to_string()
            }
            ApiError::Internal(msg) => {
                log::error!("internal error: {}", msg);
                "Server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorBody {
            success: false,
            message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_400() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InvalidTransition("wrong state".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::InsufficientStock {
                product: "Millet Flour".into()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("duplicate email".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn lookup_and_auth_errors_keep_their_status() {
        assert_eq!(
            ApiError::NotFound("no such order".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unauthorized("bad token".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn insufficient_stock_names_the_product() {
        let err = ApiError::InsufficientStock {
            product: "Pearl Millet 1kg".into(),
        };
        assert_eq!(err.to_string(), "Insufficient stock for product Pearl Millet 1kg");
    }
}
