//! Persistence seams injected into the HTTP handlers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;

use crate::models::{InvoiceRef, PreparedInvoice, StoredInvoice, Supplier, SupplierInput};

/// Invoice persistence, scoped to the owning user.
///
/// Batch writes are all-or-nothing: either every invoice in the slice is
/// stored or none is.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    /// Insert or replace by document number.
    async fn upsert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError>;

    /// Insert only; an existing document number is a conflict.
    async fn insert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError>;

    /// Newest first.
    async fn list(&self, user_id: i32) -> Result<Vec<StoredInvoice>, AppError>;

    async fn get(&self, user_id: i32, id: i32) -> Result<Option<StoredInvoice>, AppError>;

    /// Replace the whole document. Returns `false` when no such invoice exists.
    async fn update(
        &self,
        user_id: i32,
        id: i32,
        invoice: &PreparedInvoice,
    ) -> Result<bool, AppError>;

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError>;

    async fn qr_code(&self, user_id: i32, id: i32) -> Result<Option<Vec<u8>>, AppError>;

    async fn mark_exported(
        &self,
        user_id: i32,
        id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    /// Stored documents, newest first.
    async fn all_json(&self, user_id: i32) -> Result<Vec<serde_json::Value>, AppError> {
        Ok(self
            .list(user_id)
            .await?
            .into_iter()
            .map(|row| row.invoice_json)
            .collect())
    }
}

/// Supplier master persistence, scoped to the owning user.
#[async_trait]
pub trait SupplierStore: Send + Sync {
    /// Ordered by name.
    async fn list(&self, user_id: i32) -> Result<Vec<Supplier>, AppError>;

    async fn create(&self, user_id: i32, input: &SupplierInput) -> Result<Supplier, AppError>;

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError>;

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError>;
}
