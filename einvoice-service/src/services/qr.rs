//! QR code tagging of invoices.

use std::io::Cursor;

use image::{DynamicImage, Luma};
use qrcode::{EcLevel, QrCode};
use thiserror::Error;

use crate::models::EInvoice;

const QR_SIZE: u32 = 256;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("Failed to generate QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Failed to render QR code: {0}")]
    Render(#[from] image::ImageError),
}

/// `<DocDtls.No>:<TotInvVal to 2 decimals>`
pub fn qr_payload(invoice: &EInvoice) -> String {
    format!("{}:{:.2}", invoice.doc_dtls.no, invoice.val_dtls.tot_inv_val)
}

/// Render the invoice's QR payload as a PNG.
pub fn encode_png(invoice: &EInvoice) -> Result<Vec<u8>, QrError> {
    let code = QrCode::with_error_correction_level(qr_payload(invoice), EcLevel::M)?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build();

    let dynamic_image = DynamicImage::ImageLuma8(image);
    let mut buffer = Cursor::new(Vec::new());
    dynamic_image.write_to(&mut buffer, image::ImageOutputFormat::Png)?;

    Ok(buffer.into_inner())
}
