//! JWT authentication extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::admin::{Admin, AdminRole};
use crate::services::auth as auth_service;
use crate::AppState;

/// Admin authenticated by an access token and re-loaded from the database.
///
/// ```ignore
/// async fn handler(current: CurrentAdmin) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentAdmin {
    pub admin: Admin,
    /// Role as asserted by the token; `None` when the claim is not an admin role.
    pub claimed_role: Option<AdminRole>,
}

impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(AppError::not_logged_in)?;

        let claims = auth_service::validate_token(token, &state.config.jwt_secret)?;

        if claims.token_type != "access" {
            return Err(AppError::not_logged_in());
        }

        let admin_id: Uuid = claims
            .admin_id
            .parse()
            .map_err(|_| AppError::not_logged_in())?;

        let admin = match auth_service::find_admin_by_id(&state.db, admin_id).await {
            Ok(admin) => admin,
            Err(e) if e.is_not_found() => {
                return Err(AppError::Unauthorized(
                    "The user belonging to this token no longer exists.".to_string(),
                ))
            }
            Err(e) => return Err(e),
        };

        Ok(CurrentAdmin {
            admin,
            claimed_role: AdminRole::from_claim(&claims.role),
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
