//! XLSX reading and writing for bulk import, export and the upload template.

use std::io::Cursor;

use thiserror::Error;
use umya_spreadsheet::helper::coordinate::coordinate_from_index;
use umya_spreadsheet::{Cell, Spreadsheet, Worksheet};

use crate::models::EInvoice;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const EXPORT_SHEET: &str = "Invoices";
pub const TEMPLATE_SHEET: &str = "Invoice Template";
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

pub const EXPORT_HEADERS: [&str; 13] = [
    "GSTIN",
    "Invoice No",
    "Invoice Date",
    "Buyer GSTIN",
    "Buyer Name",
    "Item Description",
    "HSN Code",
    "Quantity",
    "Unit",
    "Unit Price",
    "GST Rate",
    "IGST Amount",
    "Total Amount",
];

const TEMPLATE_HEADERS: [&str; 30] = [
    "Invoice No",
    "Date (DD/MM/YYYY)",
    "Seller GSTIN",
    "Seller Legal Name",
    "Seller Trade Name",
    "Seller Address1",
    "Seller Address2",
    "Seller Location",
    "Seller PIN",
    "Seller State",
    "Seller Phone",
    "Seller Email",
    "Buyer GSTIN",
    "Buyer Legal Name",
    "Buyer Trade Name",
    "Buyer Address1",
    "Buyer Address2",
    "Buyer Location",
    "Buyer PIN",
    "Buyer State",
    "Buyer Phone",
    "Buyer Email",
    "Item No",
    "Item Description",
    "HSN Code",
    "Quantity",
    "Unit",
    "Unit Price",
    "GST Rate (%)",
    "Is Service (Y/N)",
];

const TEMPLATE_SAMPLE_ROWS: [[&str; 30]; 2] = [
    [
        "INV-001",
        "25/03/2023",
        "27AADCS0472N1Z1",
        "Sample Seller Ltd",
        "Sample Trading Co",
        "123 Business Park",
        "Floor 4",
        "Mumbai",
        "400001",
        "Maharashtra",
        "9876543210",
        "seller@example.com",
        "06AABCS1234Z1Z1",
        "Sample Buyer Ltd",
        "Sample Customer",
        "456 Industrial Area",
        "Block B",
        "Delhi",
        "110001",
        "Delhi",
        "8765432109",
        "buyer@example.com",
        "1",
        "Computer Monitor",
        "8471",
        "2",
        "PCS",
        "15000",
        "18",
        "N",
    ],
    [
        "INV-001", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "",
        "", "", "2", "Software Service", "9983", "1", "SAC", "25000", "18", "Y",
    ],
];

const INSTRUCTIONS: [&str; 9] = [
    "Instructions for filling the Excel template:",
    "1. Each row represents an invoice line item",
    "2. For multi-item invoices, repeat the invoice header information with different item details",
    "3. Date format should be DD/MM/YYYY",
    "4. GST Rate should be a number (e.g., 18 for 18%)",
    "5. Is Service should be 'Y' for services or 'N' for goods",
    "6. All required fields must be filled",
    "7. Save the file as Excel (.xlsx) format",
    "8. Upload the completed file through the 'Upload Excel' page",
];

#[derive(Debug, Error)]
pub enum SpreadsheetError {
    #[error("Failed to parse Excel file: {0}")]
    Read(String),

    #[error("No sheets found in Excel file")]
    NoSheets,

    #[error("Failed to generate Excel file: {0}")]
    Write(String),
}

/// Read the first worksheet into rows of cell text.
///
/// Trailing empty cells are dropped from each row so that a row's length
/// is the number of columns it actually fills.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let book = umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
        .map_err(|e| SpreadsheetError::Read(e.to_string()))?;
    let sheet = book.get_sheet(&0).ok_or(SpreadsheetError::NoSheets)?;

    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let mut rows = Vec::with_capacity(max_row as usize);

    for row in 1..=max_row {
        let mut cells: Vec<String> = (1..=max_col)
            .map(|col| {
                let address = coordinate_from_index(&col, &row);
                sheet
                    .get_cell(address.as_str())
                    .map(|cell| cell_text(cell).trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        while cells.last().is_some_and(|cell| cell.is_empty()) {
            cells.pop();
        }
        rows.push(cells);
    }

    Ok(rows)
}

/// Date-formatted cells read as their displayed text (e.g. `25/03/2023`);
/// everything else reads as the stored value so numbers keep full precision.
fn cell_text(cell: &Cell) -> String {
    let is_date = cell
        .get_style()
        .get_number_format()
        .is_some_and(|format| is_date_format(format.get_format_code()));

    if is_date {
        cell.get_formatted_value()
    } else {
        cell.get_value().to_string()
    }
}

/// A number format shows a date when it carries day or year tokens
/// outside quoted literals and bracketed sections.
fn is_date_format(code: &str) -> bool {
    let mut quoted = false;
    let mut bracketed = false;
    for ch in code.chars() {
        match ch {
            '"' => quoted = !quoted,
            '[' if !quoted => bracketed = true,
            ']' if !quoted => bracketed = false,
            'd' | 'D' | 'y' | 'Y' if !quoted && !bracketed => return true,
            _ => {}
        }
    }
    false
}

/// One row per line item, under [`EXPORT_HEADERS`].
pub fn export_invoices<'a, I>(invoices: I) -> Result<Vec<u8>, SpreadsheetError>
where
    I: IntoIterator<Item = &'a EInvoice>,
{
    let mut book = umya_spreadsheet::new_file_empty_worksheet();
    let sheet = new_sheet(&mut book, EXPORT_SHEET)?;
    write_text_row(sheet, 1, &EXPORT_HEADERS);

    let mut row = 2;
    for invoice in invoices {
        for item in &invoice.item_list {
            write_text_row(
                sheet,
                row,
                &[
                    invoice.seller_dtls.gstin.as_str(),
                    invoice.doc_dtls.no.as_str(),
                    invoice.doc_dtls.dt.as_str(),
                    invoice.buyer_dtls.gstin.as_str(),
                    invoice.buyer_dtls.lgl_nm.as_str(),
                    item.prd_desc.as_str(),
                    item.hsn_cd.as_str(),
                ],
            );
            set_number(sheet, 8, row, item.qty);
            set_text(sheet, 9, row, &item.unit);
            set_number(sheet, 10, row, item.unit_price);
            set_number(sheet, 11, row, item.gst_rt);
            set_number(sheet, 12, row, item.igst_amt);
            set_number(sheet, 13, row, item.tot_item_val);
            row += 1;
        }
    }

    tracing::debug!(rows = row - 2, "Built invoice export workbook");
    to_bytes(&book)
}

/// Blank upload template with two sample rows and an instructions sheet.
pub fn upload_template() -> Result<Vec<u8>, SpreadsheetError> {
    let mut book = umya_spreadsheet::new_file_empty_worksheet();

    let sheet = new_sheet(&mut book, TEMPLATE_SHEET)?;
    write_text_row(sheet, 1, &TEMPLATE_HEADERS);
    for (offset, sample) in TEMPLATE_SAMPLE_ROWS.iter().enumerate() {
        write_text_row(sheet, offset as u32 + 2, sample);
    }

    let instructions = new_sheet(&mut book, INSTRUCTIONS_SHEET)?;
    for (offset, line) in INSTRUCTIONS.iter().enumerate() {
        set_text(instructions, 1, offset as u32 + 1, line);
    }

    to_bytes(&book)
}

fn new_sheet<'a>(book: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet, SpreadsheetError> {
    book.new_sheet(name)
        .map_err(|e| SpreadsheetError::Write(e.to_string()))
}

fn write_text_row(sheet: &mut Worksheet, row: u32, values: &[&str]) {
    for (offset, value) in values.iter().enumerate() {
        set_text(sheet, offset as u32 + 1, row, value);
    }
}

fn set_text(sheet: &mut Worksheet, col: u32, row: u32, value: &str) {
    let address = coordinate_from_index(&col, &row);
    sheet.get_cell_mut(address.as_str()).set_value(value);
}

fn set_number(sheet: &mut Worksheet, col: u32, row: u32, value: f64) {
    let address = coordinate_from_index(&col, &row);
    sheet.get_cell_mut(address.as_str()).set_value_number(value);
}

fn to_bytes(book: &Spreadsheet) -> Result<Vec<u8>, SpreadsheetError> {
    let mut buffer = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut buffer)
        .map_err(|e| SpreadsheetError::Write(e.to_string()))?;
    Ok(buffer.into_inner())
}
