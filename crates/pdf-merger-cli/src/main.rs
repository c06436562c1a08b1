//! PDF Merger CLI - Command line tool for merging PDF documents.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_merger_core::{AppConfig, PageSizing, PdfDocument, PdfMerger, SourceSelection};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;


#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeOption {
    /// Each output page takes its source page's dimensions
    Source,
    /// Fixed 595x842 pages; oversized sources are clipped
    A4,
}

impl From<PageSizeOption> for PageSizing {
    fn from(opt: PageSizeOption) -> Self {
        match opt {
            PageSizeOption::Source => Self::MatchSource,
            PageSizeOption::A4 => Self::a4(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf-merge")]
#[command(author, version, about = "Merge PDF documents into one file", long_about = None)]
struct Args {
    /// Input PDF files, merged in the order given
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output file name prefix
    #[arg(long, default_value = "MERGE")]
    prefix: String,

    /// Rendering scale factor (1.0 renders pages at native size)
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Output page sizing
    #[arg(long, value_enum, default_value = "source")]
    page_size: PageSizeOption,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir;
    }
    config.filename_prefix = args.prefix;
    config.render_scale = args.scale;
    config.page_sizing = args.page_size.into();

    // Build the selection in argument order
    let selection =
        SourceSelection::from_paths(args.inputs).context("Failed to resolve input file names")?;

    // Show the ordered selection, the way the user will get it merged
    #[allow(clippy::print_stdout)]
    for (index, entry) in selection.iter().enumerate() {
        println!("{:>3}. {}", index + 1, entry.display_name());
    }

    if args.verbose > 0 {
        for entry in &selection {
            let doc = PdfDocument::from_file(entry.path())
                .with_context(|| format!("Failed to load PDF: {}", entry.path().display()))?;
            info!(
                "{}: {} pages{}",
                entry.display_name(),
                doc.page_count(),
                doc.metadata()
                    .title
                    .as_deref()
                    .map(|t| format!(", title: {t}"))
                    .unwrap_or_default()
            );
        }
    }

    // Setup progress bar
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(selection.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let progress: pdf_merger_core::ProgressCallback = {
        let pb = pb.clone();
        Box::new(move |done, _total| {
            #[allow(clippy::cast_possible_truncation)]
            pb.set_position(done as u64);
        })
    };

    let merger = PdfMerger::new(config);
    let outcome = merger
        .merge_with_progress(selection, Some(progress))
        .await
        .context("Merge failed")?;

    pb.finish_with_message("Merge complete");

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Merged PDF saved at {} ({} pages)",
            outcome.output_path.display(),
            outcome.page_count
        );
    }

    Ok(())
}
