//! Back-office administrator accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "admin_role", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum AdminRole {
    Admin,
    SuperAdmin,
}

impl AdminRole {
    /// Wire name used in JWT claims.
    pub fn as_claim(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super-admin",
        }
    }

    pub fn from_claim(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(AdminRole::Admin),
            "super-admin" => Some(AdminRole::SuperAdmin),
            _ => None,
        }
    }
}

/// Full admin row from database (includes password_hash: never serialize to API).
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin response DTO: excludes password_hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(a: Admin) -> Self {
        Self {
            id: a.id,
            name: a.name,
            email: a.email,
            role: a.role,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAdmin {
    #[validate(length(min = 1, message = "Please provide a name"))]
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    pub role: AdminRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_serialization() {
        let json = serde_json::to_string(&AdminRole::SuperAdmin).unwrap();
        assert_eq!(json, "\"super-admin\"");
        assert_eq!(AdminRole::from_claim("super-admin"), Some(AdminRole::SuperAdmin));
        assert_eq!(AdminRole::from_claim("customer"), None);
    }

    #[test]
    fn admin_response_excludes_password() {
        let json = serde_json::to_string(&AdminResponse {
            id: Uuid::nil(),
            name: "Admin".to_string(),
            email: "admin@shop.test".to_string(),
            role: AdminRole::Admin,
            created_at: Utc::now(),
        })
        .unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("createdAt"));
    }

    #[test]
    fn create_admin_requires_valid_email() {
        let input = CreateAdmin {
            name: "Ops".to_string(),
            email: "not-an-email".to_string(),
            password: "LongEnough1".to_string(),
            role: AdminRole::Admin,
        };
        assert!(input.validate().is_err());
    }
}
