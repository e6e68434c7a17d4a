mod common;

use common::{invoice, item};
use einvoice_service::services::validation::is_valid_gstin;
use einvoice_service::services::{validate, ValidationError};

#[test]
fn well_formed_invoice_passes() {
    let doc = invoice("INV-001", vec![item(2.0, 15000.0, 18.0)]);
    assert_eq!(validate(&doc), Ok(()));
}

#[test]
fn gstin_shape() {
    assert!(is_valid_gstin("07AADCS0472N1Z1"));
    assert!(is_valid_gstin("29ABCDE1234F2ZA"));

    assert!(!is_valid_gstin("07AADCS0472N1Z"));
    assert!(!is_valid_gstin("07aadcs0472n1z1"));
    assert!(!is_valid_gstin("07AADCS0472N1X1"));
    assert!(!is_valid_gstin(" 07AADCS0472N1Z1"));
    assert!(!is_valid_gstin(""));
}

#[test]
fn short_seller_gstin_is_rejected() {
    let mut doc = invoice("INV-001", vec![item(1.0, 10.0, 18.0)]);
    doc.seller_dtls.gstin = "07AADCS0472N1Z".to_string();

    let err = validate(&doc).unwrap_err();
    assert_eq!(err, ValidationError::InvalidSellerGstin);
    assert_eq!(err.to_string(), "invalid seller GSTIN format");
}

#[test]
fn zero_quantity_is_allowed() {
    let doc = invoice("INV-001", vec![item(0.0, 10.0, 18.0)]);
    assert!(validate(&doc).is_ok());
}

#[test]
fn negative_quantity_names_the_line() {
    let doc = invoice("INV-001", vec![item(1.0, 10.0, 18.0), item(-1.0, 10.0, 18.0)]);

    let err = validate(&doc).unwrap_err();
    assert_eq!(err, ValidationError::NegativeQuantity { line: 1 });
    assert_eq!(err.field(), "ItemList[1].Qty");
    assert_eq!(err.to_string(), "quantity cannot be negative");
}

#[test]
fn zero_unit_price_is_rejected() {
    let doc = invoice("INV-001", vec![item(1.0, 0.0, 18.0)]);

    let err = validate(&doc).unwrap_err();
    assert_eq!(err, ValidationError::NonPositiveUnitPrice { line: 0 });
    assert_eq!(err.to_string(), "unit price must be greater than zero");
}

#[test]
fn seller_gstin_is_checked_before_items() {
    let mut doc = invoice("INV-001", vec![item(-5.0, 0.0, 18.0)]);
    doc.seller_dtls.gstin = "bad".to_string();

    assert_eq!(validate(&doc), Err(ValidationError::InvalidSellerGstin));
}

#[test]
fn invoice_without_items_passes() {
    let doc = invoice("INV-001", vec![]);
    assert!(validate(&doc).is_ok());
}
