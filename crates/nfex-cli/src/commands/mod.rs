//! CLI subcommands.

pub mod batch;
pub mod db;
pub mod process;

use std::path::Path;

use nfex_core::{DocumentProcessor, NfexConfig, TenantContext};

/// Load configuration from an explicit path or fall back to defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<NfexConfig> {
    match config_path {
        Some(path) => Ok(NfexConfig::from_file(Path::new(path))?),
        None => Ok(NfexConfig::default()),
    }
}

/// Build a processor, attaching the Tesseract engine when it is compiled in.
pub fn build_processor(config: &NfexConfig) -> DocumentProcessor {
    #[cfg(feature = "ocr")]
    {
        DocumentProcessor::new(config.clone()).with_ocr_engine(Box::new(
            nfex_core::TesseractEngine::new(config.ocr.language.clone()),
        ))
    }
    #[cfg(not(feature = "ocr"))]
    {
        DocumentProcessor::new(config.clone())
    }
}

/// Resolve the tenant tax id from the flag or the config file.
pub fn resolve_tenant(
    flag: Option<&str>,
    config: &NfexConfig,
) -> anyhow::Result<TenantContext> {
    let tax_id = flag
        .map(str::to_string)
        .or_else(|| config.storage.tenant_tax_id.clone());
    match tax_id {
        Some(tax_id) => Ok(TenantContext::new(tax_id)),
        None => anyhow::bail!(
            "no tenant tax id: pass --tax-id or set storage.tenant_tax_id in the config file"
        ),
    }
}
