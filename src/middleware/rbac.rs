//! Role-based access control extractor for Axum handlers.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::middleware::auth::CurrentAdmin;
use crate::AppState;

/// Extractor that requires an active admin or super-admin.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentAdmin::from_request_parts(parts, state).await?;
        if !current.admin.is_active || current.claimed_role.is_none() {
            tracing::warn!(admin_id = %current.admin.id, "Admin access denied");
            return Err(AppError::Forbidden(
                "You do not have permission to perform this action".to_string(),
            ));
        }
        Ok(RequireAdmin(current))
    }
}
