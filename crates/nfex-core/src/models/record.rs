//! Product record model shared by the structured and heuristic extractors.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel used when the issuing company cannot be recovered.
pub const UNKNOWN_COMPANY: &str = "Desconhecida";

/// Provenance of an extracted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    /// Extracted from a structured NF-e XML document.
    #[serde(rename = "XML")]
    Xml,
    /// Extracted heuristically from PDF or OCR text.
    #[serde(rename = "PDF")]
    Pdf,
}

impl Origin {
    /// Storage representation, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Xml => "XML",
            Origin::Pdf => "PDF",
        }
    }
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted product fact extracted from one invoice line.
///
/// The tuple `(company, product, date, tax_id)` is the natural deduplication
/// key used by the store, so the extractors keep the formatting of those
/// fields stable within an extractor family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Issuer display name; [`UNKNOWN_COMPANY`] when unrecoverable.
    pub company: String,

    /// Issuer tax identifier (CNPJ), digits only. Empty out of the
    /// extractor when unrecoverable; the normalizer backfills it from the
    /// tenant context.
    pub tax_id: String,

    /// Free-text product description. Mandatory: items without one are
    /// discarded by the extractors.
    pub product: String,

    /// Quantity; defaults to 1.0 during normalization when non-numeric.
    pub quantity: f64,

    /// Unit price.
    pub unit_value: f64,

    /// Line total.
    pub total_value: f64,

    /// Provenance tag, fixed per extractor family.
    pub origin: Origin,

    /// Issue date. XML records carry the schema timestamp verbatim; PDF
    /// records carry an ISO `YYYY-MM-DD` date (or empty before
    /// normalization).
    pub date: String,
}

/// A line item as produced by an extractor, before header fields are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    /// Product description.
    pub product: String,
    /// Quantity.
    pub quantity: f64,
    /// Unit price.
    pub unit_value: f64,
    /// Line total.
    pub total_value: f64,
}

/// Header fields recovered from a free-text document, each optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    /// Issuer display name.
    pub company: Option<String>,
    /// Issuer CNPJ, digits only.
    pub tax_id: Option<String>,
    /// Issue date.
    pub date: Option<NaiveDate>,
}

/// Why an individual line item was dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// One of the numeric fields failed to parse.
    BadNumber,
    /// No description was found for the item.
    MissingDescription,
}

/// An individual line item that was dropped, with enough context to audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedItem {
    /// Why the item was dropped.
    pub reason: SkipReason,
    /// Where it was found: XML item ordinal or text line number (0-based).
    pub position: usize,
    /// The offending source fragment, when available.
    pub source: String,
}
