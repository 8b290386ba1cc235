// src/main.rs
mod utils;
mod extractors;
mod storage;

use std::path::PathBuf;

use clap::Parser;
use utils::AppError;
use extractors::{ExtractOptions, ListingExtractor, ListingRecord, MissingDetails, DATA_UNAVAILABLE};
use storage::StorageManager;

/// Command Line Interface for the job listing extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Saved HTML snapshot of the job board page
    #[arg(short, long, default_value = "HiringCafe.html")]
    input: PathBuf,

    /// Output directory for the listings table
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// File name of the listings table
    #[arg(long, default_value = "hiringcafe_job_listings.csv")]
    output_file: String,

    /// Field delimiter (single ASCII character, e.g. a tab for TSV)
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Text written for fields that could not be found
    #[arg(long, default_value = DATA_UNAVAILABLE)]
    sentinel: String,

    /// Use the sentinel instead of empty strings when a listing has no details block
    #[arg(long)]
    uniform_sentinel: bool,

    /// Also write a JSON metadata file next to the table
    #[arg(long)]
    metadata: bool,

    /// Debug mode - save an annotated copy of the input HTML
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    run(&args)?;
    Ok(())
}

/// Reads the snapshot, extracts listings and writes the table. Returns the
/// path of the written table.
fn run(args: &Args) -> Result<PathBuf, AppError> {
    let delimiter = delimiter_byte(args.delimiter)?;
    let options = ExtractOptions {
        sentinel: args.sentinel.clone(),
        missing_details: if args.uniform_sentinel {
            MissingDetails::Sentinel
        } else {
            MissingDetails::Empty
        },
    };

    // 3. Read the snapshot; a missing input aborts the run
    let content = std::fs::read_to_string(&args.input).map_err(|source| AppError::Input {
        path: args.input.display().to_string(),
        source,
    })?;
    tracing::info!("Read {} ({} bytes)", args.input.display(), content.len());

    // 4. Initialize storage
    let storage = StorageManager::new(&args.output_dir, delimiter)?;

    if args.debug {
        // Debug output never stops the run
        let debug_html_path = storage.base_dir().join("debug").join("listings_annotated.html");
        if let Err(e) = utils::html_debug::create_debug_html(
            &content,
            &debug_html_path,
            &utils::html_debug::LISTING_DEBUG_PATTERNS,
        ) {
            tracing::warn!("Failed to create debug HTML: {}", e);
        } else {
            tracing::info!("Created annotated debug HTML: {}", debug_html_path.display());
        }
    }

    // 5. Extract listings
    let extractor = ListingExtractor::new(options);
    let records = extractor.extract_from_html(&content);

    if records.is_empty() {
        tracing::warn!("No listings found in {}; writing header only", args.input.display());
    }
    log_listings(&records);

    // 6. Save the table (and metadata if requested)
    let path = storage.save_listings(&args.output_file, &records)?;
    tracing::info!("Saved {} listings to: {}", records.len(), path.display());

    if args.metadata {
        let meta_path = storage.save_listings_metadata(
            &args.output_file,
            &args.input,
            &records,
            extractor.options(),
        )?;
        tracing::info!("Saved listing metadata to: {}", meta_path.display());
    }

    Ok(path)
}

/// One summary line per listing, in table order.
fn log_listings(records: &[ListingRecord]) {
    for (index, record) in records.iter().enumerate() {
        tracing::info!(
            "{:>4}. {} | {} | {} | {} | {}",
            index + 1,
            record.title,
            record.company,
            record.location,
            record.salary,
            record.work_setup,
        );
    }
}

fn delimiter_byte(delimiter: char) -> Result<u8, AppError> {
    match delimiter {
        '"' | '\n' | '\r' => Err(AppError::Config(format!(
            "Delimiter {:?} would clash with CSV quoting or line endings",
            delimiter
        ))),
        c if c.is_ascii() => Ok(c as u8),
        c => Err(AppError::Config(format!("Delimiter must be a single ASCII character, got '{}'", c))),
    }
}
