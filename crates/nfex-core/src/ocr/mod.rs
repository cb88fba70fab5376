//! OCR seam for scanned documents.
//!
//! The pipeline only needs plain text out of a page image, so the engine is
//! a single-method trait. The default implementation shells into Tesseract
//! through leptess and is gated behind the `ocr` cargo feature so the crate
//! links without the system Tesseract/Leptonica libraries.

#[cfg(feature = "ocr")]
mod tesseract;

#[cfg(feature = "ocr")]
pub use tesseract::TesseractEngine;

use crate::error::OcrError;
use image::DynamicImage;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Trait for OCR engines producing a plain-text transcription of an image.
pub trait OcrEngine {
    /// Recognize all text in the image, top to bottom.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}
