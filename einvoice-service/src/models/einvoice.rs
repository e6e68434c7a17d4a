//! GST e-invoice document (schema version 1.1).

use serde::{Deserialize, Serialize};

use super::Item;

pub const SCHEMA_VERSION: &str = "1.1";

/// An invoice aggregate: header, ordered items and value totals.
///
/// This is the JSON blob that is stored, imported and exported. Every
/// section defaults when absent so partially filled payloads still decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EInvoice {
    pub version: String,
    pub tran_dtls: TranDtls,
    pub doc_dtls: DocDtls,
    pub seller_dtls: SellerDtls,
    pub buyer_dtls: BuyerDtls,
    pub item_list: Vec<Item>,
    pub val_dtls: ValDtls,
    pub exp_dtls: ExpDtls,
}

impl EInvoice {
    /// Document number, the grouping and upsert key.
    pub fn invoice_no(&self) -> &str {
        &self.doc_dtls.no
    }

    pub fn seller_gstin(&self) -> &str {
        &self.seller_dtls.gstin
    }
}

/// Transaction details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TranDtls {
    pub tax_sch: String,
    pub sup_typ: String,
    pub reg_rev: String,
}

/// Document details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DocDtls {
    pub typ: String,
    pub no: String,
    /// DD/MM/YYYY, kept as text.
    pub dt: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SellerDtls {
    pub gstin: String,
    pub lgl_nm: String,
    pub trd_nm: String,
    pub addr1: String,
    pub addr2: String,
    pub loc: String,
    pub pin: i64,
    pub stcd: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BuyerDtls {
    pub gstin: String,
    pub lgl_nm: String,
    pub trd_nm: String,
    /// Place of supply (state code).
    pub pos: String,
    pub addr1: String,
    pub addr2: String,
    pub loc: String,
    pub pin: i64,
    pub stcd: String,
}

/// Invoice-level totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ValDtls {
    pub ass_val: f64,
    pub igst_val: f64,
    pub tot_inv_val: f64,
}

/// Export details; both fields serialize as `null` when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ExpDtls {
    pub for_cur: Option<serde_json::Value>,
    pub cnt_code: Option<serde_json::Value>,
}
