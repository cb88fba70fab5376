//! Document-to-record extraction.
//!
//! Two extractor families feed the same [`crate::models::RawItem`] shape:
//! the structured NF-e XML reader ([`xml`]) and the free-text heuristics for
//! OCR'd or text-layer PDFs ([`heuristic`], [`header`]). The
//! [`normalize::Normalizer`] merges header fields into the raw items and
//! applies the documented defaults.

pub mod header;
pub mod heuristic;
pub mod normalize;
pub mod patterns;
pub mod xml;

pub use header::extract_header;
pub use heuristic::{scan_items, ItemScan, SECTION_MARKER, UNIT_TOKENS};
pub use normalize::{normalize_tax_id, Normalizer, TenantContext};
pub use xml::{extract_nfe, XmlExtraction, NFE_NAMESPACE};
