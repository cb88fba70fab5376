//! Header heuristic extractor for free-form invoice text.
//!
//! Runs independently of the line-item scan: a malformed header never
//! blocks item extraction, and vice versa.

use chrono::NaiveDate;

use super::normalize::normalize_tax_id;
use super::patterns::{CNPJ, COMPANY, DATE_BR};
use crate::models::record::Header;

/// Recover `(company, tax id, issue date)` from plain text, each field
/// independently optional. First match wins for every field; there is no
/// plausibility validation.
pub fn extract_header(text: &str) -> Header {
    let company = COMPANY
        .captures(text)
        .map(|caps| caps[1].trim().to_string());

    let tax_id = CNPJ.find(text).map(|m| normalize_tax_id(m.as_str()));

    // A date token that fails calendar parsing leaves the field empty; the
    // today-fallback belongs to the normalizer.
    let date = DATE_BR
        .find(text)
        .and_then(|m| NaiveDate::parse_from_str(m.as_str(), "%d/%m/%Y").ok());

    Header {
        company,
        tax_id,
        date,
    }
}
