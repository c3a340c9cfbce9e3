//! Storefront customer accounts, as seen by the back office.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List row with order activity.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: Uuid,
    pub fullname: String,
    pub email: String,
    pub order_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, message = "Full name cannot be empty"))]
    pub fullname: Option<String>,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    /// Customers cannot be promoted; any value other than `customer` is rejected.
    pub role: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CustomerFilters {
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_serializes_camel_case() {
        let json = serde_json::to_value(Customer {
            id: Uuid::nil(),
            fullname: "Ada Obi".to_string(),
            email: "ada@shop.test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["fullname"], "Ada Obi");
    }

    #[test]
    fn update_customer_rejects_bad_email() {
        let update = UpdateCustomer {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
