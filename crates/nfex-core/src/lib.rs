//! Core library for Brazilian fiscal document extraction.
//!
//! This crate provides:
//! - PDF processing (text-layer extraction and embedded page images)
//! - OCR seam for scanned documents (Tesseract behind the `ocr` feature)
//! - NF-e XML invoice extraction
//! - Heuristic line-item and header extraction for free-form invoice text
//! - Normalization into tenant-scoped product records

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;

pub use error::{ExtractionError, NfexError, OcrError, PdfError, Result};
pub use extract::{extract_header, extract_nfe, scan_items};
pub use extract::{ItemScan, Normalizer, TenantContext, XmlExtraction};
pub use models::config::NfexConfig;
pub use models::record::{
    Header, Origin, ProductRecord, RawItem, SkipReason, SkippedItem, UNKNOWN_COMPANY,
};
pub use ocr::OcrEngine;
#[cfg(feature = "ocr")]
pub use ocr::TesseractEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{DocumentKind, DocumentProcessor, ProcessOutcome};
