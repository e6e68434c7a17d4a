//! Bulk import reconciliation.
//!
//! Turns flat spreadsheet rows (one line item per row, header fields
//! repeated on every row) into one invoice per document number.

use indexmap::IndexMap;
use thiserror::Error;

use crate::models::{BuyerDtls, DocDtls, EInvoice, Item, SellerDtls, TranDtls, SCHEMA_VERSION};
use crate::services::totals::calculate_totals;
use crate::services::validation::{validate, ValidationError};

/// Columns every data row must carry.
pub const MIN_COLUMNS: usize = 12;

const COL_SELLER_GSTIN: usize = 0;
const COL_INVOICE_NO: usize = 1;
const COL_INVOICE_DATE: usize = 2;
const COL_BUYER_GSTIN: usize = 3;
const COL_BUYER_NAME: usize = 4;
const COL_ADDRESS: usize = 5;
const COL_LOCATION: usize = 6;
const COL_QTY: usize = 7;
const COL_UNIT: usize = 8;
const COL_UNIT_PRICE: usize = 9;
const COL_GST_RATE: usize = 10;
const COL_SERVICE: usize = 11;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Excel file does not contain enough data")]
    NotEnoughData,

    /// `row` is 1-based, counting the header row.
    #[error("Row {row} does not have enough columns")]
    MissingColumns { row: usize },

    #[error("Invoice {invoice_no}: {source}")]
    Invalid {
        invoice_no: String,
        #[source]
        source: ValidationError,
    },
}

/// Group rows by document number, compute totals and validate each group.
///
/// The first row is a header and is always skipped. Any short row fails
/// the whole batch before any invoice is validated, and the first invoice
/// that fails validation fails the batch. Output order is first-seen order.
pub fn reconcile<R: AsRef<[String]>>(rows: &[R]) -> Result<IndexMap<String, EInvoice>, ImportError> {
    if rows.len() < 2 {
        return Err(ImportError::NotEnoughData);
    }

    let mut invoices: IndexMap<String, EInvoice> = IndexMap::new();

    for (index, row) in rows.iter().enumerate().skip(1) {
        let row = row.as_ref();
        if row.len() < MIN_COLUMNS {
            return Err(ImportError::MissingColumns { row: index + 1 });
        }

        let invoice = invoices
            .entry(row[COL_INVOICE_NO].clone())
            .or_insert_with(|| invoice_header(row));

        let mut item = line_item(row);
        item.sl_no = (invoice.item_list.len() + 1).to_string();
        invoice.item_list.push(item);
    }

    for (invoice_no, invoice) in invoices.iter_mut() {
        calculate_totals(invoice);
        validate(invoice).map_err(|source| ImportError::Invalid {
            invoice_no: invoice_no.clone(),
            source,
        })?;
    }

    tracing::debug!(
        rows = rows.len() - 1,
        invoices = invoices.len(),
        "Reconciled spreadsheet rows"
    );

    Ok(invoices)
}

/// Header built from the first row seen for a document number.
fn invoice_header(row: &[String]) -> EInvoice {
    EInvoice {
        version: SCHEMA_VERSION.to_string(),
        tran_dtls: TranDtls {
            tax_sch: "GST".to_string(),
            sup_typ: "EXPWP".to_string(),
            reg_rev: "N".to_string(),
        },
        doc_dtls: DocDtls {
            typ: "INV".to_string(),
            no: row[COL_INVOICE_NO].clone(),
            dt: row[COL_INVOICE_DATE].clone(),
        },
        seller_dtls: SellerDtls {
            gstin: row[COL_SELLER_GSTIN].clone(),
            lgl_nm: "SELLER COMPANY NAME".to_string(),
            trd_nm: "SELLER TRADE NAME".to_string(),
            addr1: "SELLER ADDRESS LINE 1".to_string(),
            addr2: "SELLER ADDRESS LINE 2".to_string(),
            loc: "SELLER CITY".to_string(),
            pin: 110001,
            stcd: "07".to_string(),
        },
        buyer_dtls: BuyerDtls {
            gstin: row[COL_BUYER_GSTIN].clone(),
            lgl_nm: row[COL_BUYER_NAME].clone(),
            trd_nm: row[COL_BUYER_NAME].clone(),
            pos: "96".to_string(),
            addr1: row[COL_ADDRESS].clone(),
            addr2: String::new(),
            loc: row[COL_LOCATION].clone(),
            pin: 999999,
            stcd: "96".to_string(),
        },
        ..Default::default()
    }
}

fn line_item(row: &[String]) -> Item {
    let is_servc = if row[COL_SERVICE].trim().eq_ignore_ascii_case("Y") {
        "Y"
    } else {
        "N"
    };

    Item {
        prd_desc: row[COL_ADDRESS].clone(),
        is_servc: is_servc.to_string(),
        hsn_cd: row[COL_LOCATION].clone(),
        qty: parse_number(&row[COL_QTY]),
        unit: row[COL_UNIT].clone(),
        unit_price: parse_number(&row[COL_UNIT_PRICE]),
        gst_rt: parse_number(&row[COL_GST_RATE]),
        ..Default::default()
    }
}

/// Unparseable cells read as zero.
fn parse_number(cell: &str) -> f64 {
    cell.trim().parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_is_lenient() {
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert_eq!(parse_number("abc"), 0.0);
        assert_eq!(parse_number(""), 0.0);
    }

    #[test]
    fn header_only_sheet_is_rejected() {
        let rows = vec![vec!["GSTIN".to_string()]];
        assert!(matches!(reconcile(&rows), Err(ImportError::NotEnoughData)));
    }
}
