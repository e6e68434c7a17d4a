//! A real `Application` backed by Postgres, for exercising the SQL store.

use einvoice_service::config::EInvoiceConfig;
use einvoice_service::services::{Database, InvoiceStore};
use einvoice_service::startup::Application;
use uuid::Uuid;

use super::{bearer, TEST_SECRET};

pub struct TestServer {
    pub address: String,
    pub db: Database,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Start the service on a random port. Returns `None` when no
    /// `DATABASE_URL` is configured so the suite can run without Postgres.
    pub async fn spawn() -> Option<Self> {
        if std::env::var("DATABASE_URL").is_err() {
            eprintln!("DATABASE_URL not set, skipping Postgres-backed test");
            return None;
        }
        std::env::set_var("JWT_SECRET", TEST_SECRET);

        let mut config = EInvoiceConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        Some(TestServer {
            address,
            db,
            client,
        })
    }

    pub async fn post_json(
        &self,
        path: &str,
        user_id: i32,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("Authorization", bearer(user_id))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Remove everything the given users stored.
    pub async fn cleanup(&self, users: &[i32]) {
        for &user_id in users {
            let rows = InvoiceStore::list(&self.db, user_id)
                .await
                .unwrap_or_default();
            for row in rows {
                let _ = InvoiceStore::delete(&self.db, user_id, row.id).await;
            }
        }
    }
}

/// A user id no other test run will share.
pub fn unique_user() -> i32 {
    (Uuid::new_v4().as_u128() & 0x3fff_ffff) as i32 + 1
}

/// An invoice number no other test run will share.
pub fn unique_invoice_no(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}
