//! Mapping from einvoice domain errors onto the shared HTTP error type.

use service_core::error::AppError;

use crate::services::codec::CodecError;
use crate::services::metrics::ERRORS_TOTAL;
use crate::services::prepare::PrepareError;
use crate::services::qr::QrError;
use crate::services::reconciler::ImportError;
use crate::services::spreadsheet::SpreadsheetError;

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        let error_type = match &err {
            ImportError::Invalid { invoice_no, source } => {
                tracing::warn!(invoice_no = %invoice_no, field = %source.field(), "Imported invoice rejected");
                "validation"
            }
            _ => "import_shape",
        };
        ERRORS_TOTAL.with_label_values(&[error_type]).inc();
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

impl From<PrepareError> for AppError {
    fn from(err: PrepareError) -> Self {
        if let PrepareError::Invalid { invoice_no, source } = &err {
            tracing::warn!(invoice_no = %invoice_no, field = %source.field(), "Invoice rejected");
        }

        match err {
            PrepareError::Invalid { .. } => {
                ERRORS_TOTAL.with_label_values(&["validation"]).inc();
                AppError::BadRequest(anyhow::Error::new(err))
            }
            PrepareError::Qr(e) => e.into(),
            PrepareError::Serialize(_) => AppError::InternalError(anyhow::Error::new(err)),
        }
    }
}

impl From<CodecError> for AppError {
    fn from(err: CodecError) -> Self {
        ERRORS_TOTAL.with_label_values(&["malformed_json"]).inc();
        AppError::BadRequest(anyhow::Error::new(err))
    }
}

impl From<SpreadsheetError> for AppError {
    fn from(err: SpreadsheetError) -> Self {
        match err {
            SpreadsheetError::Read(_) | SpreadsheetError::NoSheets => {
                ERRORS_TOTAL.with_label_values(&["malformed_spreadsheet"]).inc();
                AppError::BadRequest(anyhow::Error::new(err))
            }
            SpreadsheetError::Write(_) => AppError::InternalError(anyhow::Error::new(err)),
        }
    }
}

impl From<QrError> for AppError {
    fn from(err: QrError) -> Self {
        ERRORS_TOTAL.with_label_values(&["qr"]).inc();
        AppError::InternalError(anyhow::Error::new(err))
    }
}

/// Parse a numeric path segment, rejecting anything else with `message`.
pub fn parse_id(raw: &str, message: &'static str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(anyhow::anyhow!(message)))
}
