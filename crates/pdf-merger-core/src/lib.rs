//! PDF Merger Core Library
//!
//! This library provides the core functionality for merging PDF documents:
//! - PDF page rasterization (every source page becomes a raster image)
//! - Output assembly (one image-only page per rasterized source page)
//! - The merge orchestrator tying selection, rasterizer and assembler together

pub mod config;
pub mod error;
pub mod pdf;
pub mod selection;
pub mod util;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use pdf::{
    A4_HEIGHT, A4_WIDTH, DocumentAssembler, DocumentMetadata, PageRasterizer, PageSizing,
    PdfDocument,
};
pub use selection::{SelectionEntry, SourceSelection};

use std::io::Write;
use std::path::PathBuf;

use image::RgbaImage;
use tracing::{debug, info};

/// Progress callback invoked with (documents done, documents total) after
/// each completed source document.
pub type ProgressCallback = Box<dyn Fn(usize, usize) + Send>;

/// High-level PDF merger that combines all components
pub struct PdfMerger {
    config: AppConfig,
}

/// Result of a successful merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Where the merged document was written
    pub output_path: PathBuf,
    /// Total pages in the merged document
    pub page_count: usize,
}

impl PdfMerger {
    /// Create a new PDF merger with the given configuration
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Merge the selection into a timestamped file under the configured
    /// output directory.
    ///
    /// The blocking render/assemble pipeline runs on a blocking worker so
    /// callers on an async runtime stay responsive.
    pub async fn merge(&self, selection: SourceSelection) -> Result<MergeOutcome> {
        self.merge_with_progress(selection, None).await
    }

    /// Merge with a per-document progress callback
    pub async fn merge_with_progress(
        &self,
        selection: SourceSelection,
        progress_callback: Option<ProgressCallback>,
    ) -> Result<MergeOutcome> {
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            merge_to_output_dir(&config, &selection, progress_callback.as_deref())
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    /// Merge the selection into an arbitrary byte sink.
    ///
    /// Synchronous core of [`merge`](Self::merge); returns the page count
    /// of the assembled document.
    pub fn merge_into<W: Write>(
        &self,
        selection: &SourceSelection,
        sink: &mut W,
    ) -> Result<usize> {
        let assembler = assemble_selection(&self.config, selection, None)?;
        let page_count = assembler.page_count();
        assembler.finalize_into(sink)?;
        Ok(page_count)
    }
}

/// Rasterize every page of each selected document, in selection order, and
/// append each image to a fresh assembler as soon as it is produced.
fn assemble_selection(
    config: &AppConfig,
    selection: &SourceSelection,
    progress_callback: Option<&(dyn Fn(usize, usize) + Send)>,
) -> Result<DocumentAssembler> {
    if selection.is_empty() {
        return Err(Error::EmptySelection);
    }

    info!("Merging {} document(s)", selection.len());

    let mut assembler = DocumentAssembler::new(config.page_sizing);
    let total = selection.len();

    for (index, entry) in selection.iter().enumerate() {
        let doc = PdfDocument::from_file(entry.path())?;
        debug!(
            "Rendering {} ({} pages)",
            entry.display_name(),
            doc.page_count()
        );

        let rasterizer = PageRasterizer::with_scale(&doc, config.render_scale);
        for page_num in 0..doc.page_count() {
            let image = rasterizer.render_page(page_num)?;
            assembler.append_page(&image)?;
        }

        if let Some(callback) = progress_callback {
            callback(index + 1, total);
        }
    }

    Ok(assembler)
}

fn merge_to_output_dir(
    config: &AppConfig,
    selection: &SourceSelection,
    progress_callback: Option<&(dyn Fn(usize, usize) + Send)>,
) -> Result<MergeOutcome> {
    let assembler = assemble_selection(config, selection, progress_callback)?;
    let page_count = assembler.page_count();

    // The output file only comes into existence once every page has
    // rendered, so an aborted merge leaves nothing behind.
    let output_path = config
        .output_dir
        .join(util::merge_file_name(&config.filename_prefix));
    let mut file = std::fs::File::create(&output_path).map_err(|e| {
        Error::PdfSave(format!("Failed to create {}: {}", output_path.display(), e))
    })?;
    assembler.finalize_into(&mut file)?;

    info!("Merged PDF saved at {}", output_path.display());

    Ok(MergeOutcome {
        output_path,
        page_count,
    })
}

/// Convenience function to rasterize a whole document, pages in physical order
pub fn rasterize(doc: &PdfDocument, scale: f32) -> Result<Vec<RgbaImage>> {
    let rasterizer = PageRasterizer::with_scale(doc, scale);
    rasterizer.render_document()
}
