use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::UserRole,
    utils::verify_token,
};

/// Extractor guarding the admin surface. Pulls the bearer token from the
/// `Authorization` header and rejects anything that is not a valid admin
/// session.
#[derive(Debug)]
pub struct AdminUser {
    pub id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let claims = verify_token(token)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        if claims.role != UserRole::Admin {
            return Err(ApiError::Unauthorized(
                "Admin access required".to_string(),
            ));
        }

        let id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AdminUser { id })
    }
}
