mod common;

use common::{header_row, invoice, item, sheet_row, workbook};
use einvoice_service::services::calculate_totals;
use einvoice_service::services::spreadsheet::{
    export_invoices, read_rows, upload_template, EXPORT_HEADERS, INSTRUCTIONS_SHEET,
    TEMPLATE_SHEET,
};

#[test]
fn reads_back_an_uploaded_sheet() {
    let rows = vec![header_row(), sheet_row("INV-001", "Monitor", "2", "15000", "18")];
    let parsed = read_rows(&workbook(&rows)).unwrap();

    assert_eq!(parsed, rows);
}

#[test]
fn date_cells_read_as_day_month_year() {
    let mut rows = vec![header_row(), sheet_row("INV-001", "Monitor", "2", "15000", "18")];
    rows[1][2] = String::new();

    let mut book = umya_spreadsheet::reader::xlsx::read_reader(
        std::io::Cursor::new(workbook(&rows)),
        true,
    )
    .unwrap();
    let sheet = book.get_sheet_mut(&0).unwrap();
    sheet.get_cell_mut("C2").set_value_number(45010);
    sheet
        .get_style_mut("C2")
        .get_number_format_mut()
        .set_format_code("dd/mm/yyyy");
    let mut buffer = std::io::Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(&book, &mut buffer).unwrap();

    let parsed = read_rows(&buffer.into_inner()).unwrap();

    assert_eq!(parsed[1][2], "25/03/2023");
    assert_eq!(parsed[1][7], "2");
    assert_eq!(parsed[1][9], "15000");
}

#[test]
fn export_has_one_row_per_item() {
    let mut first = invoice("INV-001", vec![item(2.0, 15000.0, 18.0), item(1.0, 500.0, 5.0)]);
    let mut second = invoice("INV-002", vec![item(1.0, 100.0, 0.0)]);
    calculate_totals(&mut first);
    calculate_totals(&mut second);

    let bytes = export_invoices([&first, &second]).unwrap();
    let rows = read_rows(&bytes).unwrap();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0], EXPORT_HEADERS.map(String::from).to_vec());
    assert_eq!(rows[1][1], "INV-001");
    assert_eq!(rows[2][1], "INV-001");
    assert_eq!(rows[3][1], "INV-002");
    assert_eq!(rows[1][11].parse::<f64>().unwrap(), 5400.0);
    assert_eq!(rows[1][12].parse::<f64>().unwrap(), 35400.0);
}

#[test]
fn empty_export_has_only_headers() {
    let bytes = export_invoices(std::iter::empty::<&einvoice_service::models::EInvoice>()).unwrap();
    let rows = read_rows(&bytes).unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].len(), EXPORT_HEADERS.len());
}

#[test]
fn template_carries_samples_and_instructions() {
    let bytes = upload_template().unwrap();
    let book =
        umya_spreadsheet::reader::xlsx::read_reader(std::io::Cursor::new(bytes.clone()), true)
            .unwrap();

    assert!(book.get_sheet_by_name(TEMPLATE_SHEET).is_some());
    assert!(book.get_sheet_by_name(INSTRUCTIONS_SHEET).is_some());

    let rows = read_rows(&bytes).unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].len(), 30);
}

#[test]
fn garbage_is_not_a_workbook() {
    assert!(read_rows(b"definitely not a zip archive").is_err());
}
