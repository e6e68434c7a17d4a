//! JSON encoding of e-invoice documents for import and export.

use serde_json::Value;
use thiserror::Error;

use crate::models::EInvoice;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Invalid JSON format: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("Invalid invoice data: {0}")]
    Invalid(#[source] serde_json::Error),

    #[error("Invalid invoice data: unexpected JSON shape")]
    UnexpectedShape,

    #[error("No invoice data provided")]
    Empty,
}

/// Decode an import body holding either one invoice or an array of them.
///
/// Returns the invoices and whether the body was a single object.
pub fn decode_import(body: &[u8]) -> Result<(Vec<EInvoice>, bool), CodecError> {
    match parse(body)? {
        value @ Value::Object(_) => {
            let invoice = serde_json::from_value(value).map_err(CodecError::Invalid)?;
            Ok((vec![invoice], true))
        }
        value @ Value::Array(_) => Ok((from_array(value)?, false)),
        _ => Err(CodecError::UnexpectedShape),
    }
}

/// Decode a non-empty JSON array of invoices.
pub fn decode_batch(body: &[u8]) -> Result<Vec<EInvoice>, CodecError> {
    match parse(body)? {
        value @ Value::Array(_) => from_array(value),
        _ => Err(CodecError::UnexpectedShape),
    }
}

/// Decode exactly one invoice object.
pub fn decode_one(body: &[u8]) -> Result<EInvoice, CodecError> {
    match parse(body)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(CodecError::Invalid),
        _ => Err(CodecError::UnexpectedShape),
    }
}

fn parse(body: &[u8]) -> Result<Value, CodecError> {
    serde_json::from_slice(body).map_err(CodecError::Malformed)
}

fn from_array(value: Value) -> Result<Vec<EInvoice>, CodecError> {
    let invoices: Vec<EInvoice> = serde_json::from_value(value).map_err(CodecError::Invalid)?;
    if invoices.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(invoices)
}

/// Storage representation of a document.
pub fn to_value(invoice: &EInvoice) -> Result<Value, serde_json::Error> {
    serde_json::to_value(invoice)
}

/// Pretty-printed JSON for file downloads.
pub fn to_pretty<T: serde::Serialize + ?Sized>(document: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(document)
}
