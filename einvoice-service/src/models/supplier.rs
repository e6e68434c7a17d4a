//! Supplier master model for einvoice-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Supplier owned by a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Supplier {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for creating or replacing a supplier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SupplierInput {
    #[validate(length(min = 1, message = "Supplier name is required"))]
    pub name: String,
    pub gstin: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
}
