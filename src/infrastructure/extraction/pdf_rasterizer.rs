use image::ImageFormat;
use pdfium_render::prelude::*;

use crate::application::ports::ExtractionError;

pub const MAX_PAGES_DUE_TO_RAM_USAGE: usize = 200;

/// PDF points per inch; page sizes are reported in points.
const POINTS_PER_INCH: f32 = 72.0;

/// Renders each page of a PDF to PNG at `dpi`.
pub(super) fn rasterize_pages(data: &[u8], dpi: u32) -> Result<Vec<Vec<u8>>, ExtractionError> {
    let pdfium = Pdfium::new(
        Pdfium::bind_to_system_library()
            .map_err(|e| ExtractionError::Unavailable(format!("pdfium bind failed: {e}")))?,
    );

    let doc = pdfium
        .load_pdf_from_byte_slice(data, None)
        .map_err(|e| ExtractionError::InvalidDocument(format!("pdfium open failed: {e}")))?;

    let page_count = doc.pages().len() as usize;
    let pages_to_render = page_count.min(MAX_PAGES_DUE_TO_RAM_USAGE);
    if page_count > pages_to_render {
        tracing::warn!(
            page_count,
            rendered = pages_to_render,
            "Document exceeds page cap; trailing pages skipped"
        );
    }

    let scale = dpi as f32 / POINTS_PER_INCH;
    let mut png_buffers: Vec<Vec<u8>> = Vec::with_capacity(pages_to_render);

    for index in 0..pages_to_render {
        let page = doc.pages().get(index as u16).map_err(|e| {
            ExtractionError::Failed(format!("page {} access failed: {e}", index + 1))
        })?;

        let width = (page.width().value * scale) as i32;
        let height = (page.height().value * scale) as i32;

        let bitmap = page
            .render_with_config(
                &PdfRenderConfig::new()
                    .set_target_width(width)
                    .set_target_height(height),
            )
            .map_err(|e| {
                ExtractionError::Failed(format!("render page {} failed: {e}", index + 1))
            })?;

        let mut png_bytes: Vec<u8> = Vec::new();
        bitmap
            .as_image()
            .write_to(&mut std::io::Cursor::new(&mut png_bytes), ImageFormat::Png)
            .map_err(|e| {
                ExtractionError::Failed(format!("PNG encode page {} failed: {e}", index + 1))
            })?;

        png_buffers.push(png_bytes);
    }

    Ok(png_buffers)
}
