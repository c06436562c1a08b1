//! Integration tests for pdf-merger-core
//!
//! These tests verify the end-to-end workflow:
//! - PDF loading and page rasterization
//! - Assembly of rasterized pages into one output document
//! - Output file naming and failure behavior
//!
//! Fixtures are minimal PDFs generated in-process with lopdf, so the tests
//! carry no binary files.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::PathBuf;

use lopdf::{Dictionary, Document, Object, Stream, content::{Content, Operation}};
use pdf_merger_core::{
    AppConfig, Error, PageRasterizer, PageSizing, PdfDocument, PdfMerger, SourceSelection,
};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Build a minimal PDF with one page per `(width, height)` entry.
fn create_test_pdf(page_sizes: &[(f32, f32)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let resources_id = doc.add_object(Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([(
            "F1",
            Object::Reference(font_id),
        )])),
    )]));

    let mut kids = Vec::new();
    for (index, &(width, height)) in page_sizes.iter().enumerate() {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![10.into(), 10.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Page {}", index + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_bytes = content.encode().unwrap();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(resources_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    Object::Real(width),
                    Object::Real(height),
                ]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let page_count = i64::try_from(page_sizes.len()).unwrap();
    let page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(page_count)),
    ]);
    doc.objects.insert(page_tree_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(page_tree_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).unwrap();
    output
}

/// Write fixture PDFs into `dir` and return their paths.
fn write_fixtures(dir: &std::path::Path, files: &[(&str, &[(f32, f32)])]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, sizes)| {
            let path = dir.join(name);
            fs::write(&path, create_test_pdf(sizes)).unwrap();
            path
        })
        .collect()
}

fn media_box(doc: &Document, page_id: lopdf::ObjectId) -> [f32; 4] {
    let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
    let arr = page.get(b"MediaBox").unwrap().as_array().unwrap();
    let mut out = [0.0; 4];
    for (slot, obj) in out.iter_mut().zip(arr) {
        *slot = match obj {
            #[allow(clippy::cast_precision_loss)]
            Object::Integer(i) => *i as f32,
            Object::Real(r) => *r,
            other => panic!("unexpected MediaBox entry: {other:?}"),
        };
    }
    out
}

// =============================================================================
// Rasterizer Tests
// =============================================================================

#[test]
fn test_rasterized_page_has_native_dimensions() {
    let doc = PdfDocument::from_bytes(create_test_pdf(&[(200.0, 100.0)])).unwrap();
    let rasterizer = PageRasterizer::new(&doc);

    let image = rasterizer.render_page(0).unwrap();
    assert_eq!(image.dimensions(), (200, 100));
}

#[test]
fn test_rasterized_page_scales() {
    let doc = PdfDocument::from_bytes(create_test_pdf(&[(200.0, 100.0)])).unwrap();
    let rasterizer = PageRasterizer::with_scale(&doc, 2.0);

    let image = rasterizer.render_page(0).unwrap();
    assert_eq!(image.dimensions(), (400, 200));
}

#[test]
fn test_rasterized_background_is_opaque_white() {
    let doc = PdfDocument::from_bytes(create_test_pdf(&[(100.0, 100.0)])).unwrap();
    let rasterizer = PageRasterizer::new(&doc);

    let image = rasterizer.render_page(0).unwrap();
    // Top-left corner carries no content; transparent regions must come
    // out white, not black or undefined
    assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[test]
fn test_render_document_page_order() {
    let doc =
        PdfDocument::from_bytes(create_test_pdf(&[(100.0, 50.0), (200.0, 60.0)])).unwrap();
    let rasterizer = PageRasterizer::new(&doc);

    let images = rasterizer.render_document().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].dimensions(), (100, 50));
    assert_eq!(images[1].dimensions(), (200, 60));
}

#[test]
fn test_invalid_pdf_bytes() {
    let result = PdfDocument::from_bytes(vec![0, 1, 2, 3]);
    assert!(result.is_err(), "Should fail for invalid PDF bytes");
}

// =============================================================================
// Merge Pipeline Tests
// =============================================================================

#[test]
fn test_merge_page_count_and_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(
        dir.path(),
        &[
            ("x.pdf", &[(200.0, 300.0), (200.0, 300.0)]),
            ("y.pdf", &[(400.0, 500.0)]),
        ],
    );

    let merger = PdfMerger::new(AppConfig::default());
    let selection = SourceSelection::from_paths(paths).unwrap();

    let mut output = Vec::new();
    let page_count = merger.merge_into(&selection, &mut output).unwrap();
    assert_eq!(page_count, 3);

    let merged = Document::load_mem(&output).unwrap();
    let pages = merged.get_pages();
    assert_eq!(pages.len(), 3);

    // MatchSource sizing: every output page mirrors its source page's
    // dimensions, which pins down the document/page ordering
    let expected = [[200.0, 300.0], [200.0, 300.0], [400.0, 500.0]];
    for (page_num, [width, height]) in (1u32..).zip(expected) {
        assert_eq!(media_box(&merged, pages[&page_num]), [0.0, 0.0, width, height]);
    }
}

#[test]
fn test_merge_fixed_page_size_clips_oversized_sources() {
    let dir = tempfile::tempdir().unwrap();
    // First source is larger than A4 in both directions
    let paths = write_fixtures(
        dir.path(),
        &[
            ("big.pdf", &[(1200.0, 1700.0)]),
            ("small.pdf", &[(100.0, 50.0)]),
        ],
    );

    let config = AppConfig {
        page_sizing: PageSizing::a4(),
        ..Default::default()
    };
    let merger = PdfMerger::new(config);
    let selection = SourceSelection::from_paths(paths).unwrap();

    let mut output = Vec::new();
    merger.merge_into(&selection, &mut output).unwrap();

    let merged = Document::load_mem(&output).unwrap();
    for &page_id in merged.get_pages().values() {
        assert_eq!(media_box(&merged, page_id), [0.0, 0.0, 595.0, 842.0]);
    }
}

#[test]
fn test_duplicate_selection_duplicates_pages() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(dir.path(), &[("x.pdf", &[(100.0, 100.0), (100.0, 100.0)])]);

    let merger = PdfMerger::new(AppConfig::default());
    let path = paths[0].clone();
    let selection = SourceSelection::from_paths([path.clone(), path]).unwrap();

    let mut output = Vec::new();
    let page_count = merger.merge_into(&selection, &mut output).unwrap();
    assert_eq!(page_count, 4);
}

#[test]
fn test_merged_pages_rerender_like_their_sources() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(dir.path(), &[("x.pdf", &[(200.0, 100.0)])]);

    let source = PdfDocument::from_file(&paths[0]).unwrap();
    let source_image = PageRasterizer::new(&source).render_page(0).unwrap();

    let merger = PdfMerger::new(AppConfig::default());
    let selection = SourceSelection::from_paths(paths).unwrap();
    let mut output = Vec::new();
    merger.merge_into(&selection, &mut output).unwrap();

    // Re-open the merged output and rasterize its first page
    let merged = PdfDocument::from_bytes(output).unwrap();
    let merged_image = PageRasterizer::new(&merged).render_page(0).unwrap();

    assert_eq!(merged_image.dimensions(), source_image.dimensions());

    // Both renders carry the page's text somewhere and a white margin
    let has_ink = |img: &image::RgbaImage| img.pixels().any(|p| p.0[0] < 128);
    assert!(has_ink(&source_image));
    assert!(has_ink(&merged_image));
    assert_eq!(merged_image.get_pixel(0, 0).0, [255, 255, 255, 255]);
}

#[tokio::test]
async fn test_merge_writes_timestamped_file() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();
    let paths = write_fixtures(
        input_dir.path(),
        &[
            ("x.pdf", &[(200.0, 300.0), (200.0, 300.0)]),
            ("y.pdf", &[(400.0, 500.0)]),
        ],
    );

    let config = AppConfig {
        output_dir: output_dir.path().to_path_buf(),
        ..Default::default()
    };
    let merger = PdfMerger::new(config);
    let selection = SourceSelection::from_paths(paths).unwrap();

    let outcome = merger.merge(selection).await.unwrap();
    assert_eq!(outcome.page_count, 3);
    assert!(outcome.output_path.exists());

    let file_name = outcome.output_path.file_name().unwrap().to_str().unwrap();
    assert!(file_name.starts_with("MERGE"));
    assert!(file_name.ends_with(".pdf"));

    let bytes = fs::read(&outcome.output_path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(Document::load_mem(&bytes).unwrap().get_pages().len(), 3);
}

#[tokio::test]
async fn test_empty_selection_creates_no_file() {
    let output_dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        output_dir: output_dir.path().to_path_buf(),
        ..Default::default()
    };
    let merger = PdfMerger::new(config);

    let result = merger.merge(SourceSelection::new()).await;
    assert!(matches!(result, Err(Error::EmptySelection)));
    assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unreadable_document_leaves_no_output() {
    let input_dir = tempfile::tempdir().unwrap();
    let output_dir = tempfile::tempdir().unwrap();

    let good = input_dir.path().join("good.pdf");
    fs::write(&good, create_test_pdf(&[(200.0, 300.0)])).unwrap();
    let corrupt = input_dir.path().join("corrupt.pdf");
    fs::write(&corrupt, b"this is not a pdf").unwrap();

    let config = AppConfig {
        output_dir: output_dir.path().to_path_buf(),
        ..Default::default()
    };
    let merger = PdfMerger::new(config);
    let selection = SourceSelection::from_paths([good, corrupt]).unwrap();

    let result = merger.merge(selection).await;
    assert!(matches!(result, Err(Error::PdfOpen(_))));
    // The first document merged fine, but no partial output may exist
    assert_eq!(fs::read_dir(output_dir.path()).unwrap().count(), 0);
}
