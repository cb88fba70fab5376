//! Database command - query and maintain the product store.

use clap::{Args, Subcommand};
use console::style;

use crate::store::ProductStore;
use super::process::{format_records, OutputFormat};

/// Arguments for the db command.
#[derive(Args)]
pub struct DbArgs {
    #[command(subcommand)]
    command: DbCommand,
}

#[derive(Subcommand)]
enum DbCommand {
    /// List stored records for one tenant
    Query {
        /// Tenant tax id (CNPJ); overrides the config file
        #[arg(short, long)]
        tax_id: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete one tenant's records, optionally bounded by date
    Delete {
        /// Tenant tax id (CNPJ); overrides the config file
        #[arg(short, long)]
        tax_id: Option<String>,

        /// Start of the date range (inclusive, YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End of the date range (inclusive, YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Drop and recreate the products table
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(args: DbArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;
    let store = ProductStore::open(&config.storage.database).await?;

    match args.command {
        DbCommand::Query { tax_id, format } => {
            let ctx = super::resolve_tenant(tax_id.as_deref(), &config)?;
            let records = store.fetch_by_tax_id(&ctx.tax_id).await?;
            println!("{}", format_records(&records, format)?);
        }
        DbCommand::Delete { tax_id, from, to } => {
            let ctx = super::resolve_tenant(tax_id.as_deref(), &config)?;
            let deleted = match (from, to) {
                (Some(from), Some(to)) => {
                    store.delete_by_date_range(&ctx.tax_id, &from, &to).await?
                }
                _ => store.delete_by_tax_id(&ctx.tax_id).await?,
            };
            println!("{} Deleted {} records", style("✓").green(), deleted);
        }
        DbCommand::Reset { yes } => {
            if !yes {
                anyhow::bail!("Refusing to reset without --yes");
            }
            store.reset().await?;
            println!("{} Database reset", style("✓").green());
        }
    }

    Ok(())
}
