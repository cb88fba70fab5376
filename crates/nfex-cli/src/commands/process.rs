//! Process command - extract product records from a single document.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use nfex_core::{DocumentKind, ProcessOutcome, ProductRecord};

use crate::store::ProductStore;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (NF-e XML, PDF, or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Tenant tax id (CNPJ); overrides the config file
    #[arg(short, long)]
    tax_id: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also persist the records to the configured database
    #[arg(long)]
    store: bool,

    /// List skipped line items on stderr
    #[arg(long)]
    show_skipped: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = super::load_config(config_path)?;
    let ctx = super::resolve_tenant(args.tax_id.as_deref(), &config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let outcome = extract_file(&args.input, &config, &ctx)?;

    if args.show_skipped && !outcome.skipped.is_empty() {
        eprintln!("{}", style("Skipped items:").yellow());
        for skip in &outcome.skipped {
            eprintln!("  - position {}: {:?} ({})", skip.position, skip.reason, skip.source);
        }
    }

    let output = format_records(&outcome.records, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.store {
        let store = ProductStore::open(&config.storage.database).await?;
        let mut inserted = 0u64;
        for record in &outcome.records {
            if store.insert_if_absent(record).await? {
                inserted += 1;
            }
        }
        println!(
            "{} Stored {} new records ({} duplicates ignored)",
            style("✓").green(),
            inserted,
            outcome.records.len() as u64 - inserted
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

/// Read one file and run it through the pipeline, keyed on its extension.
pub fn extract_file(
    path: &Path,
    config: &nfex_core::NfexConfig,
    ctx: &nfex_core::TenantContext,
) -> anyhow::Result<ProcessOutcome> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let kind = DocumentKind::from_extension(extension)
        .ok_or_else(|| anyhow::anyhow!("Unsupported file format: {}", extension))?;

    let data = fs::read(path)?;
    let processor = super::build_processor(config);
    Ok(processor.process(kind, &data, ctx)?)
}

pub fn format_records(records: &[ProductRecord], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => format_csv(records),
        OutputFormat::Text => Ok(format_text(records)),
    }
}

pub fn format_csv(records: &[ProductRecord]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "company",
        "tax_id",
        "product",
        "quantity",
        "unit_value",
        "total_value",
        "origin",
        "date",
    ])?;

    for record in records {
        wtr.write_record([
            &record.company,
            &record.tax_id,
            &record.product,
            &record.quantity.to_string(),
            &record.unit_value.to_string(),
            &record.total_value.to_string(),
            record.origin.as_str(),
            &record.date,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(records: &[ProductRecord]) -> String {
    let mut output = String::new();

    for record in records {
        output.push_str(&format!("{}\n", record.product));
        output.push_str(&format!("  Company: {} ({})\n", record.company, record.tax_id));
        output.push_str(&format!(
            "  {} x {:.2} = {:.2}\n",
            record.quantity, record.unit_value, record.total_value
        ));
        output.push_str(&format!("  Date: {}  Origin: {}\n", record.date, record.origin));
        output.push('\n');
    }
    output.push_str(&format!("{} records\n", records.len()));

    output
}
