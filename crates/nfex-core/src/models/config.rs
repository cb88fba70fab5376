//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the nfex pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NfexConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Storage configuration.
    pub storage: StorageConfig,
}

impl Default for NfexConfig {
    fn default() -> Self {
        Self {
            pdf: PdfConfig::default(),
            ocr: OcrConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text-layer length (in characters, after trimming) below
    /// which a PDF is treated as scanned and sent to OCR.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language model to use.
    pub language: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "por".to_string(),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub database: PathBuf,

    /// Default tenant tax id (CNPJ) used as fallback when a PDF header
    /// carries none. Can be overridden per invocation.
    pub tenant_tax_id: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("nfex.db"),
            tenant_tax_id: None,
        }
    }
}

impl NfexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = NfexConfig::default();
        assert_eq!(config.pdf.min_text_length, 50);
        assert_eq!(config.ocr.language, "por");
        assert!(config.storage.tenant_tax_id.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: NfexConfig =
            serde_json::from_str(r#"{"ocr": {"language": "eng"}}"#).unwrap();
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.pdf.min_text_length, 50);
    }
}
