//! Tesseract OCR engine via leptess.

use std::io::Write;

use image::DynamicImage;
use leptess::LepTess;
use tempfile::NamedTempFile;
use tracing::debug;

use super::{OcrEngine, Result};
use crate::error::OcrError;

/// OCR engine backed by the system Tesseract installation.
pub struct TesseractEngine {
    language: String,
}

impl TesseractEngine {
    /// Create an engine for the given Tesseract language model
    /// (`"por"` for Brazilian invoices).
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        // leptess reads from a path, so round-trip through a temp PNG.
        let mut tmp = NamedTempFile::with_suffix(".png")
            .map_err(|e| OcrError::Recognition(format!("temp file: {}", e)))?;

        let mut png = Vec::new();
        image
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| OcrError::Recognition(format!("encode page image: {}", e)))?;
        tmp.write_all(&png)
            .map_err(|e| OcrError::Recognition(format!("write page image: {}", e)))?;

        let mut engine = LepTess::new(None, &self.language)
            .map_err(|e| OcrError::Init(e.to_string()))?;
        engine
            .set_image(tmp.path())
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        let text = engine
            .get_utf8_text()
            .map_err(|e| OcrError::Recognition(e.to_string()))?;

        debug!("OCR produced {} characters", text.len());
        Ok(text)
    }
}
