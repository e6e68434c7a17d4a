//! GST e-invoice service: invoice totals, bulk spreadsheet import,
//! validation, QR tagging and JSON/XLSX export over HTTP.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
