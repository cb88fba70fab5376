//! Document processing pipeline: acquisition, extraction, normalization.
//!
//! Processing is synchronous and document-at-a-time. Batch independence
//! (one document's failure never aborting its siblings) is the caller's
//! responsibility.

use tracing::{debug, info};

use crate::error::{ExtractionError, NfexError, OcrError, Result};
use crate::extract::{extract_header, extract_nfe, scan_items, Normalizer, TenantContext};
use crate::models::config::NfexConfig;
use crate::models::record::{ProductRecord, SkippedItem};
use crate::ocr::OcrEngine;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// What kind of document a byte stream is believed to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// NF-e XML invoice.
    Xml,
    /// PDF, digital or scanned.
    Pdf,
    /// Raster image (photo or scan).
    Image,
}

impl DocumentKind {
    /// Guess the kind from a file extension, case-insensitively.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xml" => Some(DocumentKind::Xml),
            "pdf" => Some(DocumentKind::Pdf),
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" | "webp" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

/// Result of processing one document.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    /// Normalized records, in extraction order, ready for storage.
    pub records: Vec<ProductRecord>,
    /// Line items that were dropped, with reasons.
    pub skipped: Vec<SkippedItem>,
}

/// One-document-at-a-time processor tying the stages together.
pub struct DocumentProcessor {
    config: NfexConfig,
    normalizer: Normalizer,
    ocr: Option<Box<dyn OcrEngine>>,
}

impl DocumentProcessor {
    pub fn new(config: NfexConfig) -> Self {
        Self {
            config,
            normalizer: Normalizer::new(),
            ocr: None,
        }
    }

    /// Attach an OCR engine for scanned PDFs and image inputs.
    pub fn with_ocr_engine(mut self, engine: Box<dyn OcrEngine>) -> Self {
        self.ocr = Some(engine);
        self
    }

    /// Pin the normalizer, for deterministic tests.
    pub fn with_normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Process one document through acquisition, extraction, and
    /// normalization. Errors are fatal for this document only.
    pub fn process(
        &self,
        kind: DocumentKind,
        data: &[u8],
        ctx: &TenantContext,
    ) -> Result<ProcessOutcome> {
        match kind {
            DocumentKind::Xml => self.process_xml(data, ctx),
            DocumentKind::Pdf => {
                let text = self.acquire_pdf_text(data)?;
                self.process_free_text(&text, ctx)
            }
            DocumentKind::Image => {
                let text = self.acquire_image_text(data)?;
                self.process_free_text(&text, ctx)
            }
        }
    }

    fn process_xml(&self, data: &[u8], ctx: &TenantContext) -> Result<ProcessOutcome> {
        let xml = std::str::from_utf8(data)
            .map_err(|e| NfexError::Extraction(ExtractionError::Encoding(e.to_string())))?;

        let extraction = extract_nfe(xml)?;
        let records = self.normalizer.normalize_xml(&extraction, ctx);

        info!(
            "XML document: {} records, {} skipped items",
            records.len(),
            extraction.skipped.len()
        );
        Ok(ProcessOutcome {
            records,
            skipped: extraction.skipped,
        })
    }

    /// Run the item and header heuristics over already-acquired text.
    pub fn process_free_text(&self, text: &str, ctx: &TenantContext) -> Result<ProcessOutcome> {
        let scan = scan_items(text);
        let header = extract_header(text);
        let records = self.normalizer.normalize_pdf(&scan.items, &header, ctx);

        info!(
            "free-text document: {} records, {} skipped triggers",
            records.len(),
            scan.skipped.len()
        );
        Ok(ProcessOutcome {
            records,
            skipped: scan.skipped,
        })
    }

    /// Best-effort plain-text transcription of a PDF: the text layer when
    /// it is substantial, otherwise OCR over the page images, in page
    /// order. One pass, no retry.
    pub fn acquire_pdf_text(&self, data: &[u8]) -> Result<String> {
        let mut extractor = PdfExtractor::new();
        extractor.load(data)?;

        let text = extractor.extract_text().unwrap_or_default();
        if text.trim().chars().count() >= self.config.pdf.min_text_length {
            return Ok(text);
        }

        debug!(
            "text layer below {} chars, treating PDF as scanned",
            self.config.pdf.min_text_length
        );

        let engine = self.ocr.as_deref().ok_or(OcrError::Unavailable)?;
        let mut ocr_text = String::new();
        for page in 1..=extractor.page_count() {
            for image in extractor.extract_page_images(page)? {
                ocr_text.push_str(&engine.recognize(&image)?);
            }
        }
        Ok(ocr_text)
    }

    fn acquire_image_text(&self, data: &[u8]) -> Result<String> {
        let engine = self.ocr.as_deref().ok_or(OcrError::Unavailable)?;
        let image = image::load_from_memory(data)?;
        Ok(engine.recognize(&image)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::Origin;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn processor() -> DocumentProcessor {
        DocumentProcessor::new(NfexConfig::default()).with_normalizer(Normalizer::with_today(
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        ))
    }

    fn ctx() -> TenantContext {
        TenantContext::new("98765432000110")
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(DocumentKind::from_extension("XML"), Some(DocumentKind::Xml));
        assert_eq!(DocumentKind::from_extension("pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_extension("jpeg"), Some(DocumentKind::Image));
        assert_eq!(DocumentKind::from_extension("docx"), None);
    }

    #[test]
    fn xml_document_end_to_end() {
        let xml = format!(
            r#"<NFe xmlns="{}"><infNFe>
                 <ide><dhEmi>2024-03-10T08:00:00-03:00</dhEmi></ide>
                 <emit><xNome>Mercado Central LTDA</xNome><CNPJ>12345678000199</CNPJ></emit>
                 <det><prod><xProd>Arroz 5kg</xProd><qCom>2</qCom>
                   <vUnCom>25,90</vUnCom><vProd>51,80</vProd></prod></det>
               </infNFe></NFe>"#,
            crate::extract::NFE_NAMESPACE,
        );
        let outcome = processor()
            .process(DocumentKind::Xml, xml.as_bytes(), &ctx())
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.origin, Origin::Xml);
        assert_eq!(record.company, "Mercado Central LTDA");
        assert_eq!(record.date, "2024-03-10T08:00:00-03:00");
        assert_eq!(record.total_value, 51.80);
    }

    #[test]
    fn free_text_items_without_header_get_tenant_defaults() {
        let text = "DESCRIÇÃO DO PRODUTO\nUN\n3\n10,50\n31,50\nCaneta azul BIC\n";
        let outcome = processor().process_free_text(text, &ctx()).unwrap();

        assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        assert_eq!(record.product, "Caneta azul BIC");
        assert_eq!(record.origin, Origin::Pdf);
        assert_eq!(record.tax_id, "98765432000110");
        assert_eq!(record.date, "2024-03-15");
    }

    #[test]
    fn header_recovered_even_when_no_items_parse() {
        let text = "MERCADO BOM PRECO LTDA\n12.345.678/0001-99\n10/03/2024\nsem tabela";
        let outcome = processor().process_free_text(text, &ctx()).unwrap();
        assert!(outcome.records.is_empty());
    }

    #[test]
    fn scanned_pdf_without_engine_is_an_ocr_failure() {
        // Minimal empty-ish PDF parses but has no meaningful text layer.
        let pdf = minimal_pdf();
        let err = processor()
            .process(DocumentKind::Pdf, &pdf, &ctx())
            .unwrap_err();
        assert!(matches!(err, NfexError::Ocr(OcrError::Unavailable)));
    }

    #[test]
    fn image_without_engine_is_an_ocr_failure() {
        let err = processor()
            .process(DocumentKind::Image, &[0u8; 4], &ctx())
            .unwrap_err();
        assert!(matches!(err, NfexError::Ocr(OcrError::Unavailable)));
    }

    /// A one-page PDF with no content streams, built by lopdf.
    fn minimal_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }
}
