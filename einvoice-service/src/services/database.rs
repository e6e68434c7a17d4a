//! Database service for einvoice-service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::models::{InvoiceRef, PreparedInvoice, StoredInvoice, Supplier, SupplierInput};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::store::{InvoiceStore, SupplierStore};

const INVOICE_COLUMNS: &str = "id, user_id, seller_gstin, invoice_no, invoice_json, qr_code, \
     exported, exported_at, created_at, updated_at";

const SUPPLIER_COLUMNS: &str =
    "id, user_id, name, gstin, address, city, state, pincode, phone, email, created_at";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "einvoice-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    async fn write_batch(
        &self,
        operation: &'static str,
        user_id: i32,
        invoices: &[PreparedInvoice],
        sql: &str,
    ) -> Result<Vec<InvoiceRef>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&[operation])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let mut refs = Vec::with_capacity(invoices.len());
        for invoice in invoices {
            let id: Option<i32> = sqlx::query_scalar(sql)
                .bind(user_id)
                .bind(invoice.seller_gstin())
                .bind(invoice.invoice_no())
                .bind(&invoice.invoice_json)
                .bind(&invoice.qr_code)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| invoice_write_error(e, invoice.invoice_no()))?;

            // An upsert that returns nothing hit a row owned by someone else.
            let id = id.ok_or_else(|| {
                AppError::Conflict(anyhow::anyhow!(
                    "Invoice {} already exists",
                    invoice.invoice_no()
                ))
            })?;
            refs.push(InvoiceRef::new(id, invoice.invoice_no()));
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit invoices: {}", e))
        })?;

        timer.observe_duration();

        info!(user_id = user_id, count = refs.len(), operation, "Invoices stored");

        Ok(refs)
    }
}

fn invoice_write_error(e: sqlx::Error, invoice_no: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict(anyhow::anyhow!("Invoice {} already exists", invoice_no))
        }
        _ => AppError::DatabaseError(anyhow::anyhow!(
            "Failed to store invoice {}: {}",
            invoice_no,
            e
        )),
    }
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    #[instrument(skip(self, invoices), fields(count = invoices.len()))]
    async fn upsert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError> {
        self.write_batch(
            "upsert_invoices",
            user_id,
            invoices,
            r#"
            INSERT INTO invoices (user_id, seller_gstin, invoice_no, invoice_json, qr_code)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (invoice_no) DO UPDATE
            SET seller_gstin = EXCLUDED.seller_gstin,
                invoice_json = EXCLUDED.invoice_json,
                qr_code = EXCLUDED.qr_code,
                updated_at = NOW()
            WHERE invoices.user_id = EXCLUDED.user_id
            RETURNING id
            "#,
        )
        .await
    }

    #[instrument(skip(self, invoices), fields(count = invoices.len()))]
    async fn insert_batch(
        &self,
        user_id: i32,
        invoices: &[PreparedInvoice],
    ) -> Result<Vec<InvoiceRef>, AppError> {
        self.write_batch(
            "insert_invoices",
            user_id,
            invoices,
            r#"
            INSERT INTO invoices (user_id, seller_gstin, invoice_no, invoice_json, qr_code)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list(&self, user_id: i32) -> Result<Vec<StoredInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_invoices"])
            .start_timer();

        let invoices = sqlx::query_as::<_, StoredInvoice>(&format!(
            "SELECT {} FROM invoices WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            INVOICE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list invoices: {}", e)))?;

        timer.observe_duration();

        Ok(invoices)
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: i32, id: i32) -> Result<Option<StoredInvoice>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_invoice"])
            .start_timer();

        let invoice = sqlx::query_as::<_, StoredInvoice>(&format!(
            "SELECT {} FROM invoices WHERE id = $1 AND user_id = $2",
            INVOICE_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get invoice: {}", e)))?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self, invoice), fields(invoice_no = %invoice.invoice_no()))]
    async fn update(
        &self,
        user_id: i32,
        id: i32,
        invoice: &PreparedInvoice,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET seller_gstin = $1, invoice_no = $2, invoice_json = $3, qr_code = $4, updated_at = NOW()
            WHERE id = $5 AND user_id = $6
            "#,
        )
        .bind(invoice.seller_gstin())
        .bind(invoice.invoice_no())
        .bind(&invoice.invoice_json)
        .bind(&invoice.qr_code)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| invoice_write_error(e, invoice.invoice_no()))?;

        timer.observe_duration();

        let updated = result.rows_affected() > 0;
        if updated {
            info!(invoice_id = id, "Invoice updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete invoice: {}", e))
            })?;

        timer.observe_duration();

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(invoice_id = id, "Invoice deleted");
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn qr_code(&self, user_id: i32, id: i32) -> Result<Option<Vec<u8>>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_qr_code"])
            .start_timer();

        let qr_code: Option<Option<Vec<u8>>> =
            sqlx::query_scalar("SELECT qr_code FROM invoices WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to get QR code: {}", e))
                })?;

        timer.observe_duration();

        Ok(qr_code.flatten())
    }

    #[instrument(skip(self))]
    async fn mark_exported(
        &self,
        user_id: i32,
        id: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["mark_exported"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE invoices SET exported = TRUE, exported_at = $1, updated_at = $1
            WHERE id = $2 AND user_id = $3
            "#,
        )
        .bind(at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update invoice: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn all_json(&self, user_id: i32) -> Result<Vec<serde_json::Value>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["all_invoice_json"])
            .start_timer();

        let documents = sqlx::query_scalar(
            "SELECT invoice_json FROM invoices WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch invoices: {}", e)))?;

        timer.observe_duration();

        Ok(documents)
    }
}

#[async_trait]
impl SupplierStore for Database {
    #[instrument(skip(self))]
    async fn list(&self, user_id: i32) -> Result<Vec<Supplier>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_suppliers"])
            .start_timer();

        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {} FROM suppliers WHERE user_id = $1 ORDER BY name",
            SUPPLIER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to fetch suppliers: {}", e)))?;

        timer.observe_duration();

        Ok(suppliers)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create(&self, user_id: i32, input: &SupplierInput) -> Result<Supplier, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_supplier"])
            .start_timer();

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            INSERT INTO suppliers (user_id, name, gstin, address, city, state, pincode, phone, email)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(user_id)
        .bind(&input.name)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.pincode)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create supplier: {}", e)))?;

        timer.observe_duration();

        info!(supplier_id = supplier.id, "Supplier created");

        Ok(supplier)
    }

    #[instrument(skip(self, input))]
    async fn update(
        &self,
        user_id: i32,
        id: i32,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_supplier"])
            .start_timer();

        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            r#"
            UPDATE suppliers
            SET name = $1, gstin = $2, address = $3, city = $4, state = $5,
                pincode = $6, phone = $7, email = $8
            WHERE id = $9 AND user_id = $10
            RETURNING {}
            "#,
            SUPPLIER_COLUMNS
        ))
        .bind(&input.name)
        .bind(&input.gstin)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.state)
        .bind(input.pincode)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update supplier: {}", e)))?;

        timer.observe_duration();

        Ok(supplier)
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: i32, id: i32) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_supplier"])
            .start_timer();

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete supplier: {}", e))
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }
}
