//! Turns a decoded invoice into a row ready for storage.

use thiserror::Error;

use crate::models::{EInvoice, PreparedInvoice};
use crate::services::codec;
use crate::services::qr::{self, QrError};
use crate::services::totals::calculate_totals;
use crate::services::validation::{validate, ValidationError};

#[derive(Debug, Error)]
pub enum PrepareError {
    #[error("Invoice {invoice_no}: {source}")]
    Invalid {
        invoice_no: String,
        #[source]
        source: ValidationError,
    },

    #[error(transparent)]
    Qr(#[from] QrError),

    #[error("Failed to serialize invoice: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Compute totals, validate, then derive the QR code and stored JSON.
pub fn prepare(mut invoice: EInvoice) -> Result<PreparedInvoice, PrepareError> {
    calculate_totals(&mut invoice);
    validate(&invoice).map_err(|source| PrepareError::Invalid {
        invoice_no: invoice.invoice_no().to_string(),
        source,
    })?;
    finish(invoice)
}

/// Derive the QR code and stored JSON for an invoice that already has its
/// totals computed and has passed validation.
pub fn finish(invoice: EInvoice) -> Result<PreparedInvoice, PrepareError> {
    let qr_code = qr::encode_png(&invoice)?;
    let invoice_json = codec::to_value(&invoice)?;

    Ok(PreparedInvoice {
        invoice,
        invoice_json,
        qr_code,
    })
}

/// Prepare every invoice, stopping at the first failure.
pub fn prepare_all(invoices: Vec<EInvoice>) -> Result<Vec<PreparedInvoice>, PrepareError> {
    invoices.into_iter().map(prepare).collect()
}
