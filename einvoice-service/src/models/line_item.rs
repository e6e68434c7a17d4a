//! Line item model for einvoice-service.

use serde::{Deserialize, Serialize};

/// One product or service entry on an e-invoice (`ItemList[]`).
///
/// `TotAmt`, `AssAmt`, `IgstAmt` and `TotItemVal` are derived from
/// `Qty`, `UnitPrice` and `GstRt`; whatever a client sends for them is
/// overwritten by [`Item::recompute`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Item {
    pub sl_no: String,
    pub prd_desc: String,
    /// "Y" for services, "N" for goods.
    pub is_servc: String,
    pub hsn_cd: String,
    pub qty: f64,
    pub unit: String,
    pub unit_price: f64,
    pub tot_amt: f64,
    pub ass_amt: f64,
    /// Tax rate in percent.
    pub gst_rt: f64,
    pub igst_amt: f64,
    pub tot_item_val: f64,
}

impl Item {
    /// Recompute the derived amounts from quantity, unit price and rate.
    pub fn recompute(&mut self) {
        self.tot_amt = self.qty * self.unit_price;
        self.ass_amt = self.tot_amt;
        self.igst_amt = self.ass_amt * self.gst_rt / 100.0;
        self.tot_item_val = self.ass_amt + self.igst_amt;
    }
}
