use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;
use validator::Validate;

use crate::error::parse_id;
use crate::middleware::CurrentUser;
use crate::models::SupplierInput;
use crate::startup::AppState;

const INVALID_ID: &str = "Invalid supplier ID";

fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Supplier not found or not authorized"))
}

pub async fn list_suppliers(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let suppliers = state.suppliers.list(user_id).await?;
    Ok(Json(json!({ "suppliers": suppliers })))
}

pub async fn create_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(input): Json<SupplierInput>,
) -> Result<impl IntoResponse, AppError> {
    input.validate()?;

    let supplier = state.suppliers.create(user_id, &input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Supplier created successfully",
            "supplier": supplier,
        })),
    ))
}

pub async fn update_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(input): Json<SupplierInput>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;
    input.validate()?;

    let supplier = state
        .suppliers
        .update(user_id, id, &input)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(json!({
        "message": "Supplier updated successfully",
        "supplier": supplier,
    })))
}

pub async fn delete_supplier(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, INVALID_ID)?;

    if !state.suppliers.delete(user_id, id).await? {
        return Err(not_found());
    }

    Ok(Json(json!({
        "message": "Supplier deleted successfully",
        "supplier_id": id,
    })))
}
