use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

use crate::{
    database::Database,
    error::ApiError,
    models::{User, UserRole},
    utils::{create_token, verify_password},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user_type: UserRole,
}

pub async fn login(
    State(db): State<Database>,
    Json(form): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(ApiError::Validation("Missing credentials".to_string()));
    }

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(form.username.trim())
        .fetch_optional(&db)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    let matches = verify_password(&form.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("password verify failed: {}", e)))?;

    if !matches {
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }

    let role = UserRole::parse(&user.role)
        .ok_or_else(|| ApiError::Internal(format!("unknown role tag '{}'", user.role)))?;

    let token = create_token(user.id, role)
        .map_err(|e| ApiError::Internal(format!("token signing failed: {}", e)))?;

    Ok(Json(LoginResponse {
        success: true,
        token,
        user_type: role,
    }))
}
