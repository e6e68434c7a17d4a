pub mod health;
pub mod invoices;
pub mod suppliers;
pub mod transfer;

pub use health::{health_check, metrics_endpoint, readiness_check};
pub use invoices::{
    delete_invoice, generate_invoice, get_invoice, get_qr_code, list_invoices, mark_exported,
    update_invoice,
};
pub use suppliers::{create_supplier, delete_supplier, list_suppliers, update_supplier};
pub use transfer::{
    download_template, export_all_json, export_invoices, export_json, import_json, upload_excel,
};
