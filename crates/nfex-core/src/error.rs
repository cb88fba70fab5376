//! Error types for the nfex-core library.

use thiserror::Error;

/// Main error type for the nfex library.
#[derive(Error, Debug)]
pub enum NfexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Document extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Image processing error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// Failed to extract page images from PDF.
    #[error("failed to extract images: {0}")]
    ImageExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to initialize the OCR engine.
    #[error("failed to initialize OCR engine: {0}")]
    Init(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// No OCR engine is available for a scanned document.
    #[error("no OCR engine available (build with the `ocr` feature)")]
    Unavailable,
}

/// Errors related to document extraction.
///
/// Per-item parse failures are deliberately NOT errors: they are reported
/// as skips next to the extracted items so a malformed line never fails
/// the whole document.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The byte stream cannot be parsed as the expected container at all.
    #[error("unreadable document: {0}")]
    Document(String),

    /// The document is not valid UTF-8 where text was expected.
    #[error("invalid encoding: {0}")]
    Encoding(String),
}

/// Result type for the nfex library.
pub type Result<T> = std::result::Result<T, NfexError>;
