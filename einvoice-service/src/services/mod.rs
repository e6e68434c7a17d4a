//! Services module for einvoice-service.

pub mod codec;
pub mod database;
pub mod metrics;
pub mod prepare;
pub mod qr;
pub mod reconciler;
pub mod spreadsheet;
pub mod store;
pub mod totals;
pub mod validation;

pub use database::Database;
pub use metrics::{get_metrics, init_metrics};
pub use reconciler::{reconcile, ImportError};
pub use store::{InvoiceStore, SupplierStore};
pub use totals::calculate_totals;
pub use validation::{validate, ValidationError};
