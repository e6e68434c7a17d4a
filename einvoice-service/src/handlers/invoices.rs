use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use service_core::error::AppError;

use crate::error::parse_id;
use crate::middleware::CurrentUser;
use crate::models::InvoiceSummary;
use crate::services::codec;
use crate::services::metrics::INVOICES_PERSISTED_TOTAL;
use crate::services::prepare::{prepare, prepare_all};
use crate::startup::AppState;

const INVALID_ID: &str = "Invalid invoice ID";

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Invoice not found or not authorized"))
}

/// Create invoices from a JSON array; a document number that already
/// exists is a conflict.
pub async fn generate_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let invoices = codec::decode_batch(&body)?;
    let prepared = prepare_all(invoices)?;

    let refs = state.invoices.insert_batch(user_id, &prepared).await?;
    INVOICES_PERSISTED_TOTAL
        .with_label_values(&["generate"])
        .inc_by(refs.len() as f64);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Invoice(s) generated successfully",
            "invoices": refs,
        })),
    ))
}

pub async fn list_invoices(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let rows = state.invoices.list(user_id).await?;
    let invoices: Vec<InvoiceSummary> = rows.iter().map(InvoiceSummary::from).collect();

    Ok(Json(json!({ "invoices": invoices })))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let row = state
        .invoices
        .get(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))?;

    let invoice = row.document().map_err(|e| {
        AppError::InternalError(anyhow::anyhow!("Failed to parse invoice data: {}", e))
    })?;

    Ok(Json(json!({ "invoice": invoice, "id": id })))
}

/// Replace a stored invoice with a new document; totals and QR are redone.
pub async fn update_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let prepared = prepare(codec::decode_one(&body)?)?;

    if !state.invoices.update(user_id, id, &prepared).await? {
        return Err(not_found());
    }
    INVOICES_PERSISTED_TOTAL.with_label_values(&["update"]).inc();

    Ok(Json(json!({
        "message": "Invoice updated successfully",
        "invoice_id": id,
    })))
}

pub async fn delete_invoice(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    if !state.invoices.delete(user_id, id).await? {
        return Err(not_found());
    }

    Ok(Json(json!({
        "message": "Invoice deleted successfully",
        "invoice_id": id,
    })))
}

pub async fn mark_exported(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let now = Utc::now();

    if !state.invoices.mark_exported(user_id, id, now).await? {
        return Err(not_found());
    }

    Ok(Json(json!({
        "message": "Invoice marked as exported successfully",
        "invoice_id": id,
        "exported_at": now,
    })))
}

pub async fn get_qr_code(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    let png = state
        .invoices
        .qr_code(user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("QR code not found")))?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
