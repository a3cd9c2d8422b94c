// src/main.rs
mod utils;
mod extractors;
mod parser;
mod storage;

use std::process::ExitCode;
use clap::Parser;
use utils::AppError;
use extractors::{DocxExtractor, ExtractedText};
use parser::{ExamItem, RecordParser};
use parser::records::DEFAULT_HEADER_LINES;
use storage::{RunSummary, StorageManager};

/// Blueprint document this tool was built around
const DEFAULT_INPUT_PATH: &str = "KISI-KISI TO TKA MATEMATIKA SMP KAB. BOGOR TIPE B.docx";
const DEFAULT_PREVIEW_LINES: usize = 30;

/// Command Line Interface for the exam blueprint (kisi-kisi) extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the blueprint DOCX document
    #[arg(short, long, default_value = DEFAULT_INPUT_PATH)]
    input: String,

    /// Output directory for the parsed JSON files
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// Number of leading template lines to skip before parsing
    #[arg(long, default_value_t = DEFAULT_HEADER_LINES)]
    header_lines: usize,

    /// Number of extracted lines to print for inspection
    #[arg(long, default_value_t = DEFAULT_PREVIEW_LINES)]
    preview: usize,

    /// Also save the raw extracted lines to extracted_content.json
    #[arg(short, long)]
    dump_lines: bool,
}

fn main() -> ExitCode {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting processing for args: {:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            eprintln!("{}", failure_message(&e));
            ExitCode::FAILURE
        }
    }
}

/// Fatal errors are reported through their display text.
fn failure_message(error: &AppError) -> String {
    format!("Error: {}", error)
}

fn run(args: &Args) -> Result<(), AppError> {
    // 3. Initialize storage
    let storage = StorageManager::new(&args.output_dir)?;

    // 4. Extract text lines from the document
    let extracted = DocxExtractor::new().extract_file(&args.input)?;
    print_line_preview(&extracted, args.preview);

    if args.dump_lines {
        storage.save_extracted_lines(&extracted.lines)?;
    }

    // 5. Regroup lines into exam items
    let record_parser = RecordParser::with_header_lines(args.header_lines);
    let records = record_parser.parse(&extracted.lines);
    let complete_record_count = records.iter().filter(|record| record.has_metadata()).count();
    tracing::info!(
        "Parsed {} items ({} with a complete metadata block)",
        records.len(),
        complete_record_count
    );

    // 6. Persist results
    storage.save_records(&records)?;
    storage.save_run_metadata(&RunSummary {
        source: args.input.clone(),
        line_count: extracted.lines.len(),
        paragraph_count: extracted.paragraph_count,
        table_cell_count: extracted.table_cell_count,
        header_lines: record_parser.header_lines(),
        record_count: records.len(),
        complete_record_count,
    })?;

    print_record_preview(&records)?;

    tracing::info!("Processing finished.");
    Ok(())
}

fn print_line_preview(extracted: &ExtractedText, limit: usize) {
    println!("Extracted {} lines", extracted.lines.len());
    if limit == 0 || extracted.lines.is_empty() {
        return;
    }

    println!("\nFirst {} lines:", limit.min(extracted.lines.len()));
    for (index, line) in extracted.lines.iter().take(limit).enumerate() {
        println!("{}. {}", index + 1, line);
    }
}

fn print_record_preview(records: &[ExamItem]) -> Result<(), AppError> {
    println!("\nParsed {} questions", records.len());
    if let Some(sample) = records.first() {
        println!("\nSample question:");
        println!("{}", serde_json::to_string_pretty(sample)?);
    }
    Ok(())
}
