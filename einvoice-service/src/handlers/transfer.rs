//! Bulk import and file export endpoints.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;

use crate::error::parse_id;
use crate::middleware::{CurrentUser, DownloadUser};
use crate::models::EInvoice;
use crate::services::codec;
use crate::services::metrics::{IMPORT_ROWS_TOTAL, INVOICES_PERSISTED_TOTAL};
use crate::services::prepare::{finish, prepare_all};
use crate::services::reconcile;
use crate::services::spreadsheet::{self, XLSX_CONTENT_TYPE};
use crate::startup::AppState;

/// Import invoices from an uploaded XLSX sheet, one line item per row.
///
/// The whole sheet is rejected on the first bad row or invalid invoice,
/// and nothing is stored unless every invoice is.
pub async fn upload_excel(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let data = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
            })?
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

        if field.name() != Some("file") {
            continue;
        }

        if field.content_type() != Some(XLSX_CONTENT_TYPE) {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only Excel files (.xlsx) are supported"
            )));
        }

        break field.bytes().await.map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
        })?;
    };

    let rows = spreadsheet::read_rows(&data)?;
    let data_rows = rows.len().saturating_sub(1) as f64;

    let invoices = match reconcile(&rows) {
        Ok(invoices) => invoices,
        Err(e) => {
            IMPORT_ROWS_TOTAL
                .with_label_values(&["rejected"])
                .inc_by(data_rows);
            return Err(e.into());
        }
    };
    IMPORT_ROWS_TOTAL
        .with_label_values(&["accepted"])
        .inc_by(data_rows);

    let prepared = invoices
        .into_values()
        .map(finish)
        .collect::<Result<Vec<_>, _>>()?;

    let refs = state.invoices.upsert_batch(user_id, &prepared).await?;
    INVOICES_PERSISTED_TOTAL
        .with_label_values(&["excel"])
        .inc_by(refs.len() as f64);

    tracing::info!(user_id, invoices = refs.len(), "Spreadsheet imported");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Invoices imported successfully",
            "invoices": refs,
        })),
    ))
}

/// Import one invoice object or an array of them, replacing any stored
/// invoice with the same document number.
pub async fn import_json(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let (invoices, single) = codec::decode_import(&body)?;
    let prepared = prepare_all(invoices)?;

    let refs = state.invoices.upsert_batch(user_id, &prepared).await?;
    INVOICES_PERSISTED_TOTAL
        .with_label_values(&["json"])
        .inc_by(refs.len() as f64);

    let body = if single {
        json!({
            "message": "Invoice imported successfully",
            "invoice": refs.first(),
        })
    } else {
        json!({
            "message": format!("{} invoice(s) imported successfully", refs.len()),
            "invoices": refs,
        })
    };

    Ok((StatusCode::CREATED, Json(body)))
}

/// All of the user's invoices as an XLSX sheet, one row per line item.
pub async fn export_invoices(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.invoices.list(user_id).await?;
    let documents: Vec<EInvoice> = rows
        .iter()
        .filter_map(|row| match row.document() {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(invoice_id = row.id, error = %e, "Skipping unreadable invoice in export");
                None
            }
        })
        .collect();

    let workbook = spreadsheet::export_invoices(&documents)?;

    Ok(attachment(XLSX_CONTENT_TYPE, "invoices.xlsx", workbook))
}

pub async fn download_template() -> Result<impl IntoResponse, AppError> {
    let workbook = spreadsheet::upload_template()?;
    Ok(attachment(XLSX_CONTENT_TYPE, "invoice_template.xlsx", workbook))
}

/// One stored invoice as a pretty-printed JSON file.
pub async fn export_json(
    State(state): State<AppState>,
    DownloadUser(user_id): DownloadUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "Invalid invoice ID")?;
    let row = state
        .invoices
        .get(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let body = codec::to_pretty(&row.invoice_json)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to serialize invoice: {}", e)))?;

    Ok(attachment(
        "application/json; charset=utf-8",
        &format!("invoice-{}.json", row.invoice_no),
        body,
    ))
}

pub async fn export_all_json(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let documents = state.invoices.all_json(user_id).await?;
    let body = codec::to_pretty(&documents).map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to serialize invoices: {}", e))
    })?;

    let filename = format!("all-invoices-{}.json", Utc::now().format("%Y-%m-%d"));
    Ok(attachment("application/json", &filename, body))
}

fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
            (header::CACHE_CONTROL, "no-cache".to_string()),
        ],
        body,
    )
}
