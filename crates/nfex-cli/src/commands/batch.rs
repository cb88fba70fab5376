//! Batch processing command for a directory of invoice documents.
//!
//! Every file is processed independently: one bad document is reported
//! and never aborts the rest of the run.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use nfex_core::ProcessOutcome;

use crate::store::ProductStore;
use super::process::{format_records, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Tenant tax id (CNPJ); overrides the config file
    #[arg(short, long)]
    tax_id: Option<String>,

    /// Output directory for per-file extraction results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Persist all extracted records to the configured database
    #[arg(long)]
    store: bool,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    outcome: Option<ProcessOutcome>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let ctx = super::resolve_tenant(args.tax_id.as_deref(), &config)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            nfex_core::DocumentKind::from_extension(ext).is_some()
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let result = super::process::extract_file(&path, &config, &ctx);
        match result {
            Ok(outcome) => {
                results.push(FileResult {
                    path,
                    outcome: Some(outcome),
                    error: None,
                });
            }
            Err(e) => {
                warn!("Failed to process {}: {}", path.display(), e);
                results.push(FileResult {
                    path,
                    outcome: None,
                    error: Some(e.to_string()),
                });
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Complete");

    // Per-file outputs
    if let Some(ref output_dir) = args.output_dir {
        for result in results.iter().filter(|r| r.outcome.is_some()) {
            let outcome = result.outcome.as_ref().unwrap();
            let output_name = result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("document");
            let extension = match args.format {
                OutputFormat::Json => "json",
                OutputFormat::Csv => "csv",
                OutputFormat::Text => "txt",
            };
            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            fs::write(&output_path, format_records(&outcome.records, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.store {
        let store = ProductStore::open(&config.storage.database).await?;
        let mut inserted = 0u64;
        let mut total = 0u64;
        for outcome in results.iter().filter_map(|r| r.outcome.as_ref()) {
            for record in &outcome.records {
                total += 1;
                if store.insert_if_absent(record).await? {
                    inserted += 1;
                }
            }
        }
        println!(
            "{} Stored {} new records ({} duplicates ignored)",
            style("✓").green(),
            inserted,
            total - inserted
        );
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));
        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let successful = results.iter().filter(|r| r.outcome.is_some()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn write_summary(path: &PathBuf, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["filename", "status", "records", "skipped", "error"])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        match &result.outcome {
            Some(outcome) => {
                wtr.write_record([
                    filename,
                    "success",
                    &outcome.records.len().to_string(),
                    &outcome.skipped.len().to_string(),
                    "",
                ])?;
            }
            None => {
                wtr.write_record([
                    filename,
                    "error",
                    "0",
                    "0",
                    result.error.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
