//! Domain models for einvoice-service.

mod einvoice;
mod invoice;
mod line_item;
mod supplier;

pub use einvoice::{
    BuyerDtls, DocDtls, EInvoice, ExpDtls, SellerDtls, TranDtls, ValDtls, SCHEMA_VERSION,
};
pub use invoice::{qr_url, InvoiceRef, InvoiceSummary, PreparedInvoice, StoredInvoice};
pub use line_item::Item;
pub use supplier::{Supplier, SupplierInput};
