#![allow(dead_code)]

pub mod server;

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use einvoice_service::middleware::{Claims, TokenVerifier};
use einvoice_service::models::{
    EInvoice, InvoiceRef, Item, PreparedInvoice, StoredInvoice, Supplier, SupplierInput,
};
use einvoice_service::services::{InvoiceStore, SupplierStore};
use einvoice_service::startup::{router, AppState};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::Secret;
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-jwt-secret";
pub const TEST_USER_ID: i32 = 7;
pub const OTHER_USER_ID: i32 = 8;
pub const SELLER_GSTIN: &str = "07AADCS0472N1Z1";

/// In-memory stand-in for the Postgres store with the same uniqueness and
/// all-or-nothing batch rules.
#[derive(Default)]
pub struct MemoryStore {
    invoices: Mutex<Vec<StoredInvoice>>,
    suppliers: Mutex<Vec<Supplier>>,
    next_id: Mutex<i32>,
}

impl MemoryStore {
    fn next_id(&self) -> i32 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    pub fn invoice_count(&self) -> usize {
        self.invoices.lock().unwrap().len()
    }

    pub fn stored(&self, invoice_no: &str) -> Option<StoredInvoice> {
        self.invoices
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.invoice_no == invoice_no)
            .cloned()
    }

    fn write_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
        replace: bool,
    ) -> Result<Vec<InvoiceRef>, AppError> {
        let mut rows = self.invoices.lock().unwrap();
        let mut staged = rows.clone();
        let mut refs = Vec::new();

        for invoice in invoices {
            let now = Utc::now();
            match staged
                .iter_mut()
                .find(|row| row.invoice_no == invoice.invoice_no())
            {
                Some(row) if replace && row.user_id == user_id => {
                    row.seller_gstin = invoice.seller_gstin().to_string();
                    row.invoice_json = invoice.invoice_json.clone();
                    row.qr_code = Some(invoice.qr_code.clone());
                    row.updated_at = now;
                    refs.push(InvoiceRef::new(row.id, invoice.invoice_no()));
                }
                Some(_) => {
                    return Err(AppError::Conflict(anyhow::anyhow!(
                        "Invoice {} already exists",
                        invoice.invoice_no()
                    )))
                }
                None => {
                    let id = self.next_id();
                    staged.push(StoredInvoice {
                        id,
                        user_id,
                        seller_gstin: invoice.seller_gstin().to_string(),
                        invoice_no: invoice.invoice_no().to_string(),
                        invoice_json: invoice.invoice_json.clone(),
                        qr_code: Some(invoice.qr_code.clone()),
                        exported: false,
                        exported_at: None,
                        created_at: now,
                        updated_at: now,
                    });
                    refs.push(InvoiceRef::new(id, invoice.invoice_no()));
                }
            }
        }

        *rows = staged;
        Ok(refs)
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn upsert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError> {
        self.write_batch(user_id, invoices, true)
    }

    async fn insert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError> {
        self.write_batch(user_id, invoices, false)
    }

    async fn list(&self, user_id: i32) -> Result<Vec<StoredInvoice>, AppError> {
        let mut rows: Vec<StoredInvoice> = self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn get(&self, user_id: i32, id: i32) -> Result<Option<StoredInvoice>, AppError> {
        Ok(self
            .invoices
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id && row.user_id == user_id)
            .cloned())
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        invoice: &PreparedInvoice,
    ) -> Result<bool, AppError> {
        let mut rows = self.invoices.lock().unwrap();
        if rows
            .iter()
            .any(|row| row.id != id && row.invoice_no == invoice.invoice_no())
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Invoice {} already exists",
                invoice.invoice_no()
            )));
        }
        match rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            Some(row) => {
                row.seller_gstin = invoice.seller_gstin().to_string();
                row.invoice_no = invoice.invoice_no().to_string();
                row.invoice_json = invoice.invoice_json.clone();
                row.qr_code = Some(invoice.qr_code.clone());
                row.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let mut rows = self.invoices.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| !(row.id == id && row.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn qr_code(&self, user_id: i32, id: i32) -> Result<Option<Vec<u8>>, AppError> {
        Ok(InvoiceStore::get(self, user_id, id)
            .await?
            .and_then(|row| row.qr_code))
    }

    async fn mark_exported(
        &self,
        user_id: i32,
        id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let mut rows = self.invoices.lock().unwrap();
        match rows
            .iter_mut()
            .find(|row| row.id == id && row.user_id == user_id)
        {
            Some(row) => {
                row.exported = true;
                row.exported_at = Some(at);
                row.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl SupplierStore for MemoryStore {
    async fn list(&self, user_id: i32) -> Result<Vec<Supplier>, AppError> {
        let mut suppliers: Vec<Supplier> = self
            .suppliers
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(suppliers)
    }

    async fn create(&self, user_id: i32, input: &SupplierInput) -> Result<Supplier, AppError> {
        let supplier = Supplier {
            id: self.next_id(),
            user_id,
            name: input.name.clone(),
            gstin: input.gstin.clone(),
            address: input.address.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            pincode: input.pincode,
            phone: input.phone.clone(),
            email: input.email.clone(),
            created_at: Utc::now(),
        };
        self.suppliers.lock().unwrap().push(supplier.clone());
        Ok(supplier)
    }

    async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError> {
        let mut suppliers = self.suppliers.lock().unwrap();
        Ok(suppliers
            .iter_mut()
            .find(|s| s.id == id && s.user_id == user_id)
            .map(|s| {
                s.name = input.name.clone();
                s.gstin = input.gstin.clone();
                s.address = input.address.clone();
                s.city = input.city.clone();
                s.state = input.state.clone();
                s.pincode = input.pincode;
                s.phone = input.phone.clone();
                s.email = input.email.clone();
                s.clone()
            }))
    }

    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let mut suppliers = self.suppliers.lock().unwrap();
        let before = suppliers.len();
        suppliers.retain(|s| !(s.id == id && s.user_id == user_id));
        Ok(suppliers.len() < before)
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: header::HeaderName) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

impl TestApp {
    pub fn spawn() -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = AppState {
            invoices: store.clone(),
            suppliers: store.clone(),
            verifier: Arc::new(TokenVerifier::new(&Secret::new(TEST_SECRET.to_string()))),
        };

        Self {
            router: router(state),
            store,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, user_id: i32) -> TestResponse {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::AUTHORIZATION, bearer(user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, user_id: i32) -> TestResponse {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .header(header::AUTHORIZATION, bearer(user_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        user_id: i32,
        body: &serde_json::Value,
    ) -> TestResponse {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::AUTHORIZATION, bearer(user_id))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn upload(&self, user_id: i32, content_type: &str, file: Vec<u8>) -> TestResponse {
        let boundary = "einvoice-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"invoices.xlsx\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&file);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/upload-excel")
                .header(header::AUTHORIZATION, bearer(user_id))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }
}

pub fn token(user_id: i32) -> String {
    let claims = Claims {
        user_id,
        exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: i32) -> String {
    format!("Bearer {}", token(user_id))
}

pub fn item(qty: f64, unit_price: f64, gst_rt: f64) -> Item {
    Item {
        prd_desc: "Computer Monitor".to_string(),
        is_servc: "N".to_string(),
        hsn_cd: "8471".to_string(),
        qty,
        unit: "PCS".to_string(),
        unit_price,
        gst_rt,
        ..Default::default()
    }
}

pub fn invoice(invoice_no: &str, items: Vec<Item>) -> EInvoice {
    let mut invoice = EInvoice::default();
    invoice.version = "1.1".to_string();
    invoice.doc_dtls.typ = "INV".to_string();
    invoice.doc_dtls.no = invoice_no.to_string();
    invoice.doc_dtls.dt = "25/03/2023".to_string();
    invoice.seller_dtls.gstin = SELLER_GSTIN.to_string();
    invoice.buyer_dtls.gstin = "URP".to_string();
    invoice.buyer_dtls.lgl_nm = "Sample Buyer Ltd".to_string();
    invoice.item_list = items;
    invoice
}

/// One spreadsheet data row in import column order.
pub fn sheet_row(invoice_no: &str, desc: &str, qty: &str, price: &str, rate: &str) -> Vec<String> {
    [
        SELLER_GSTIN,
        invoice_no,
        "25/03/2023",
        "URP",
        "Sample Buyer Ltd",
        desc,
        "8471",
        qty,
        "PCS",
        price,
        rate,
        "N",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn header_row() -> Vec<String> {
    [
        "Seller GSTIN",
        "Invoice No",
        "Invoice Date",
        "Buyer GSTIN",
        "Buyer Name",
        "Description",
        "HSN",
        "Qty",
        "Unit",
        "Unit Price",
        "GST Rate",
        "Service",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Build an XLSX workbook whose first sheet holds `rows`.
pub fn workbook(rows: &[Vec<String>]) -> Vec<u8> {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_sheet_mut(&0).unwrap();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            let address =
                umya_spreadsheet::helper::coordinate::coordinate_from_index(&(c as u32 + 1), &(r as u32 + 1));
            sheet.get_cell_mut(address.as_str()).set_value(value);
        }
    }
    let mut buffer = std::io::Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).unwrap();
    buffer.into_inner()
}
