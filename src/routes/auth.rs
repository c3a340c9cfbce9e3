//! Authentication routes: login, refresh, logout, profile and password change.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{ApiResponse, AppError};
use crate::middleware::rbac::RequireAdmin;
use crate::middleware::validation::ValidatedJson;
use crate::models::admin::AdminResponse;
use crate::services::auth::{self as auth_service, TokenPair, TokenSettings};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[serde(alias = "refresh_token")]
    #[validate(length(min = 1, message = "Please provide a refresh token"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub new_password: String,
}

/// Token pair plus the authenticated admin.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub admin: AdminResponse,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<LoginRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let (admin, tokens) = auth_service::login(
        &state.db,
        &body.email,
        &body.password,
        TokenSettings::from(&state.config),
    )
    .await?;

    Ok(ApiResponse::success(AuthResponse {
        tokens,
        admin: admin.into(),
    }))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenPair>>, AppError> {
    let tokens = auth_service::refresh_token(
        &state.db,
        &body.refresh_token,
        TokenSettings::from(&state.config),
    )
    .await?;

    Ok(ApiResponse::success(tokens))
}

/// POST /api/auth/logout: stateless JWT, the client discards its tokens.
pub async fn logout(RequireAdmin(_admin): RequireAdmin) -> Json<ApiResponse<&'static str>> {
    ApiResponse::success("Logged out successfully")
}

/// GET /api/auth/me
pub async fn me(RequireAdmin(current): RequireAdmin) -> Json<ApiResponse<AdminResponse>> {
    ApiResponse::success(AdminResponse::from(current.admin))
}

/// PATCH /api/auth/update-password: returns a fresh token pair.
pub async fn update_password(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
    ValidatedJson(body): ValidatedJson<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    let admin = auth_service::update_password(
        &state.db,
        current.admin.id,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    let tokens = auth_service::generate_tokens(&admin, TokenSettings::from(&state.config))?;

    Ok(ApiResponse::success(AuthResponse {
        tokens,
        admin: admin.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_validation() {
        let short = LoginRequest {
            email: "ops@shop.test".to_string(),
            password: "short".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = LoginRequest {
            email: "ops@shop.test".to_string(),
            password: "LongEnough1".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn refresh_request_accepts_both_spellings() {
        let camel: RefreshRequest =
            serde_json::from_value(serde_json::json!({ "refreshToken": "abc" })).unwrap();
        let snake: RefreshRequest =
            serde_json::from_value(serde_json::json!({ "refresh_token": "abc" })).unwrap();
        assert_eq!(camel.refresh_token, snake.refresh_token);
    }
}
