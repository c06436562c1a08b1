//! Output PDF assembly from rasterized page images.
//!
//! # Coordinate System
//!
//! PDF uses a **bottom-left origin** coordinate system where:
//! - (0, 0) is at the bottom-left corner of the page
//! - X increases to the right
//! - Y increases upward
//!
//! Raster images are placed with their top-left corner at the page's
//! top-left corner, so the vertical offset of the `cm` matrix is
//! `page_height - image_height`.
//!
//! # Assembly Strategy
//!
//! One Image XObject per output page, drawn unscaled at one pixel per
//! point. The assembler is append-only: pages can never be removed,
//! reordered or replaced once added.

use std::io::Write;

use image::RgbaImage;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A4 page width in points, as used by the legacy fixed page size.
pub const A4_WIDTH: f32 = 595.0;

/// A4 page height in points.
pub const A4_HEIGHT: f32 = 842.0;

/// How output pages are sized relative to their source images.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PageSizing {
    /// Each output page takes its source image's dimensions, so nothing is
    /// ever clipped or padded.
    #[default]
    MatchSource,

    /// Every output page has the given fixed size. The image still draws
    /// unscaled at the top-left corner: larger sources are clipped by the
    /// MediaBox, smaller ones leave the rest of the page blank.
    Fixed { width: f32, height: f32 },
}

impl PageSizing {
    /// The legacy fixed size: A4 at one point per pixel.
    pub const fn a4() -> Self {
        Self::Fixed {
            width: A4_WIDTH,
            height: A4_HEIGHT,
        }
    }

    /// Output page dimensions for an image of the given pixel size.
    #[allow(clippy::cast_precision_loss)]
    const fn page_dims(self, image_width: u32, image_height: u32) -> (f32, f32) {
        match self {
            Self::MatchSource => (image_width as f32, image_height as f32),
            Self::Fixed { width, height } => (width, height),
        }
    }
}

/// Append-only builder for the merged output document.
pub struct DocumentAssembler {
    doc: Document,
    /// Page tree id, allocated up front so every page can reference it
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    sizing: PageSizing,
}

impl DocumentAssembler {
    pub fn new(sizing: PageSizing) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            sizing,
        }
    }

    /// Append one output page containing the given image.
    ///
    /// The image must already be opaque; any alpha channel is ignored.
    #[allow(clippy::cast_precision_loss)]
    pub fn append_page(&mut self, image: &RgbaImage) -> Result<()> {
        let page_num = self.page_ids.len();
        let (image_width, image_height) = image.dimensions();

        if image_width == 0 || image_height == 0 {
            return Err(Error::PdfAssemble {
                page: page_num,
                reason: "image has zero dimensions".to_string(),
            });
        }

        let (page_width, page_height) = self.sizing.page_dims(image_width, image_height);

        let image_id = self
            .doc
            .add_object(Object::Stream(image_xobject(image, page_num)?));

        // Each page carries its own resource dictionary, so the XObject
        // name does not need to be unique across pages.
        let resources_id = self.doc.add_object(Dictionary::from_iter([(
            "XObject",
            Object::Dictionary(Dictionary::from_iter([(
                "Im0",
                Object::Reference(image_id),
            )])),
        )]));

        // Pin the image's top edge to the page top; drawing starts at the
        // bottom-left of the image box, which may lie below the MediaBox
        // for oversized sources (those rows are clipped away).
        let offset_y = page_height - image_height as f32;
        let content = format!(
            "q\n{} 0 0 {} 0 {} cm\n/Im0 Do\nQ\n",
            image_width as f32, image_height as f32, offset_y
        );
        let content_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), content.into_bytes()));

        let page_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    Object::Real(page_width),
                    Object::Real(page_height),
                ]),
            ),
            ("Resources", Object::Reference(resources_id)),
            ("Contents", Object::Reference(content_id)),
        ]));

        self.page_ids.push(page_id);
        Ok(())
    }

    /// Number of pages appended so far.
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Serialize the document to a byte vector.
    pub fn finalize(self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.finalize_into(&mut output)?;
        Ok(output)
    }

    /// Serialize all pages, in append order, into the given sink.
    ///
    /// Consumes the assembler; document resources are released on every
    /// path, including serialization failure.
    pub fn finalize_into<W: Write>(mut self, sink: &mut W) -> Result<()> {
        let kids: Vec<Object> = self
            .page_ids
            .iter()
            .map(|&id| Object::Reference(id))
            .collect();

        let pages_dict = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            (
                "Count",
                Object::Integer(i64::try_from(self.page_ids.len()).unwrap_or(0)),
            ),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let catalog_id = self.doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]));
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        self.doc.compress();

        self.doc
            .save_to(sink)
            .map_err(|e| Error::PdfSave(format!("Failed to save merged PDF: {e}")))
    }
}

/// Encode an opaque RGBA image as a DeviceRGB Image XObject stream.
fn image_xobject(image: &RgbaImage, page_num: usize) -> Result<Stream> {
    let (width, height) = image.dimensions();

    // Drop the (always-opaque) alpha channel
    let mut rgb_data = Vec::with_capacity((width * height * 3) as usize);
    for pixel in image.pixels() {
        rgb_data.extend_from_slice(&pixel.0[..3]);
    }

    // Lossless FlateDecode keeps the round-trip pixel-exact
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&rgb_data).map_err(|e| Error::PdfAssemble {
        page: page_num,
        reason: format!("Failed to compress image data: {e}"),
    })?;
    let compressed = encoder.finish().map_err(|e| Error::PdfAssemble {
        page: page_num,
        reason: format!("Failed to finish compression: {e}"),
    })?;

    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(i64::from(width)));
    dict.set("Height", Object::Integer(i64::from(height)));
    dict.set("ColorSpace", Object::Name(b"DeviceRGB".to_vec()));
    dict.set("BitsPerComponent", Object::Integer(8));
    dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));

    Ok(Stream::new(dict, compressed))
}
