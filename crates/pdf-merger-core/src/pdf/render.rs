use image::RgbaImage;
use mupdf::{Colorspace, Matrix};

use crate::error::{Error, Result};
use super::document::PdfDocument;
use super::page_index::PageIndex;

/// Rendered page dimensions
#[derive(Debug, Clone, Copy)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

/// Default scale factor for rendering (1.0 = native page dimensions)
pub const DEFAULT_RENDER_SCALE: f32 = 1.0;

/// Page rasterizer for PDF documents.
///
/// Every produced pixel is opaque: page content is composited over a white
/// background, since PDF pages may have transparent regions that would
/// otherwise come out with an undefined background color downstream.
pub struct PageRasterizer<'a> {
    /// The PDF document to render
    pub doc: &'a PdfDocument,
    /// Scale factor for rendering
    pub scale: f32,
}

impl<'a> PageRasterizer<'a> {
    /// Create a rasterizer with default scale (1.0)
    pub const fn new(doc: &'a PdfDocument) -> Self {
        Self {
            doc,
            scale: DEFAULT_RENDER_SCALE,
        }
    }

    /// Create a rasterizer with custom scale
    pub const fn with_scale(doc: &'a PdfDocument, scale: f32) -> Self {
        Self { doc, scale }
    }

    /// Get the size of a page at the current scale
    pub fn page_size(&self, page_num: usize) -> Result<PageSize> {
        let page_index = PageIndex::try_from_page_num(page_num, self.doc.page_count())?;

        let doc = self.doc.open_document()?;
        let page = doc.load_page(page_index.into()).map_err(|e| {
            Error::PdfRender {
                page: page_num,
                reason: format!("Failed to load page: {e}"),
            }
        })?;

        let bounds = page.bounds().map_err(|e| {
            Error::PdfRender {
                page: page_num,
                reason: format!("Failed to get bounds: {e}"),
            }
        })?;

        // PDF dimensions are always positive and reasonable (< millions of pixels)
        let width = f32_to_u32((bounds.x1 - bounds.x0) * self.scale);
        let height = f32_to_u32((bounds.y1 - bounds.y0) * self.scale);

        Ok(PageSize { width, height })
    }

    /// Render a page to an opaque RGBA image buffer
    pub fn render_page(&self, page_num: usize) -> Result<RgbaImage> {
        let page_index = PageIndex::try_from_page_num(page_num, self.doc.page_count())?;

        let doc = self.doc.open_document()?;
        let page = doc.load_page(page_index.into()).map_err(|e| {
            Error::PdfRender {
                page: page_num,
                reason: format!("Failed to load page: {e}"),
            }
        })?;

        // Create transformation matrix for scaling
        let matrix = Matrix::new_scale(self.scale, self.scale);

        // Render to pixmap (RGBA)
        let pixmap = page
            .to_pixmap(&matrix, &Colorspace::device_rgb(), 1.0, true)
            .map_err(|e| {
                Error::PdfRender {
                    page: page_num,
                    reason: format!("Failed to render: {e}"),
                }
            })?;

        // Convert to image
        let pixels = pixmap.samples();
        let img_width = pixmap.width();
        let img_height = pixmap.height();

        // mupdf may hand back RGB, RGBA or grayscale samples
        let n = pixmap.n() as usize; // components per pixel
        let mut rgba_pixels = Vec::with_capacity((img_width * img_height * 4) as usize);

        for chunk in pixels.chunks(n) {
            match n {
                3 => {
                    // RGB -> opaque RGBA
                    rgba_pixels.push(chunk[0]);
                    rgba_pixels.push(chunk[1]);
                    rgba_pixels.push(chunk[2]);
                    rgba_pixels.push(255);
                }
                4 => {
                    // RGBA: flatten onto white
                    let alpha = chunk[3];
                    rgba_pixels.push(over_white(chunk[0], alpha));
                    rgba_pixels.push(over_white(chunk[1], alpha));
                    rgba_pixels.push(over_white(chunk[2], alpha));
                    rgba_pixels.push(255);
                }
                1 => {
                    // Grayscale -> opaque RGBA
                    rgba_pixels.push(chunk[0]);
                    rgba_pixels.push(chunk[0]);
                    rgba_pixels.push(chunk[0]);
                    rgba_pixels.push(255);
                }
                _ => {
                    return Err(Error::PdfRender {
                        page: page_num,
                        reason: format!("Unexpected pixel format with {n} components"),
                    });
                }
            }
        }

        RgbaImage::from_raw(img_width, img_height, rgba_pixels).ok_or_else(|| {
            Error::PdfRender {
                page: page_num,
                reason: "Failed to create image buffer".to_string(),
            }
        })
    }

    /// Render every page, in physical order.
    ///
    /// The merge pipeline renders lazily page-by-page instead; this eager
    /// form exists for callers that want a whole document at once.
    pub fn render_document(&self) -> Result<Vec<RgbaImage>> {
        (0..self.doc.page_count())
            .map(|page_num| self.render_page(page_num))
            .collect()
    }
}

/// Composite one premultiplied-free color component over a white background.
#[allow(clippy::cast_possible_truncation)]
const fn over_white(component: u8, alpha: u8) -> u8 {
    let c = component as u32;
    let a = alpha as u32;
    ((c * a + 255 * (255 - a)) / 255) as u8
}

/// Convert f32 dimension to u32, clamping to valid range.
/// PDF dimensions are always non-negative and reasonable for rendering.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
const fn f32_to_u32(value: f32) -> u32 {
    // Precision loss on MAX is fine - we just need an upper bound
    const MAX: f32 = u32::MAX as f32;
    // Manual clamp since f32::clamp isn't const
    let clamped = if value < 0.0 {
        0.0
    } else if value > MAX {
        MAX
    } else {
        value
    };
    clamped as u32
}
