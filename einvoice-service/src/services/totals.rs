//! Invoice total calculation.

use crate::models::{EInvoice, ValDtls};

/// Recompute every item's derived amounts and the invoice totals.
///
/// Items are visited in list order and summed in that same order, so the
/// floating-point result is reproducible for a given item sequence. Only
/// derived fields are written.
pub fn calculate_totals(invoice: &mut EInvoice) {
    let mut ass_val = 0.0_f64;
    let mut igst_val = 0.0_f64;

    for item in invoice.item_list.iter_mut() {
        item.recompute();
        ass_val += item.ass_amt;
        igst_val += item.igst_amt;
    }

    invoice.val_dtls = ValDtls {
        ass_val,
        igst_val,
        tot_inv_val: ass_val + igst_val,
    };
}
