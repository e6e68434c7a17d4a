//! Stored invoice model for einvoice-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::EInvoice;

/// Invoice row as persisted: header keys, the JSON document and its QR code.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredInvoice {
    pub id: i32,
    pub user_id: i32,
    pub seller_gstin: String,
    pub invoice_no: String,
    pub invoice_json: serde_json::Value,
    #[serde(skip_serializing)]
    pub qr_code: Option<Vec<u8>>,
    pub exported: bool,
    pub exported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredInvoice {
    /// Decode the stored document.
    pub fn document(&self) -> Result<EInvoice, serde_json::Error> {
        serde_json::from_value(self.invoice_json.clone())
    }
}

/// A validated, totalled invoice ready to be written, with its derived
/// storage columns.
#[derive(Debug, Clone)]
pub struct PreparedInvoice {
    pub invoice: EInvoice,
    pub invoice_json: serde_json::Value,
    pub qr_code: Vec<u8>,
}

impl PreparedInvoice {
    pub fn invoice_no(&self) -> &str {
        self.invoice.invoice_no()
    }

    pub fn seller_gstin(&self) -> &str {
        self.invoice.seller_gstin()
    }
}

/// Reference returned after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRef {
    pub id: i32,
    pub invoice_no: String,
    pub qr_url: String,
}

impl InvoiceRef {
    pub fn new(id: i32, invoice_no: impl Into<String>) -> Self {
        Self {
            id,
            invoice_no: invoice_no.into(),
            qr_url: qr_url(id),
        }
    }
}

/// Listing entry built from a stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceSummary {
    pub id: i32,
    pub invoice_no: String,
    pub seller_gstin: String,
    pub created_at: DateTime<Utc>,
    pub qr_url: String,
    pub exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub buyer_name: String,
    pub date: String,
    pub total_value: f64,
}

impl From<&StoredInvoice> for InvoiceSummary {
    fn from(row: &StoredInvoice) -> Self {
        let (buyer_name, date, total_value) = match row.document() {
            Ok(doc) => (doc.buyer_dtls.lgl_nm, doc.doc_dtls.dt, doc.val_dtls.tot_inv_val),
            Err(e) => {
                tracing::warn!(invoice_id = row.id, error = %e, "Stored invoice JSON does not parse");
                ("Unknown".to_string(), String::new(), 0.0)
            }
        };

        Self {
            id: row.id,
            invoice_no: row.invoice_no.clone(),
            seller_gstin: row.seller_gstin.clone(),
            created_at: row.created_at,
            qr_url: qr_url(row.id),
            exported: row.exported,
            exported_at: row.exported_at,
            buyer_name,
            date,
            total_value,
        }
    }
}

pub fn qr_url(id: i32) -> String {
    format!("/api/qr/{}", id)
}
