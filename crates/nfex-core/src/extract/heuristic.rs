//! Heuristic line-item extractor for free-form invoice text.
//!
//! The scan assumes the one layout family this tool targets: the OCR'd (or
//! column-flattened) text renders each item as a unit token on its own line,
//! followed by three numeric lines (quantity, unit value, total value), with
//! the wrapped description appearing a few lines later. The heuristic is
//! brittle on purpose; do not generalize it without separate tests.

use tracing::debug;

use super::patterns::LETTER;
use crate::models::record::{RawItem, SkipReason, SkippedItem};

/// Heading that anchors the start of the tabular item list.
pub const SECTION_MARKER: &str = "DESCRIÇÃO DO PRODUTO";

/// Measurement abbreviations that mark the start of one item row.
pub const UNIT_TOKENS: [&str; 4] = ["UN", "KG", "CX", "LT"];

/// How many lines past the numeric triple to look for the description.
const DESCRIPTION_LOOKAHEAD: usize = 6;

/// Result of one free-text scan.
#[derive(Debug, Clone, Default)]
pub struct ItemScan {
    /// Items found, in text order.
    pub items: Vec<RawItem>,
    /// Triggers that did not produce an item, with the reason.
    pub skipped: Vec<SkippedItem>,
}

/// Scan plain text for line items, anchored on the section marker.
///
/// Returns an empty scan when the marker never occurs; item-level failures
/// are recorded as skips and never abort the scan.
pub fn scan_items(text: &str) -> ItemScan {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut scan = ItemScan::default();
    let mut capturing = false;

    for idx in 0..lines.len() {
        let line = lines[idx].trim();

        // The marker line itself is discarded; repeated markers re-anchor.
        if line.to_uppercase().contains(SECTION_MARKER) {
            capturing = true;
            continue;
        }
        if !capturing {
            continue;
        }

        let token = line.to_uppercase();
        if !UNIT_TOKENS.contains(&token.as_str()) {
            continue;
        }

        // Unit token found: the next three lines must be the numeric triple.
        let Some((quantity, unit_value, total_value)) = numeric_triple(&lines, idx) else {
            scan.skipped.push(SkippedItem {
                reason: SkipReason::BadNumber,
                position: idx,
                source: line.to_string(),
            });
            continue;
        };

        let Some(description) = find_description(&lines, idx) else {
            scan.skipped.push(SkippedItem {
                reason: SkipReason::MissingDescription,
                position: idx,
                source: line.to_string(),
            });
            continue;
        };

        scan.items.push(RawItem {
            product: description.to_string(),
            quantity,
            unit_value,
            total_value,
        });
    }

    debug!(
        "free-text scan: {} items, {} skipped triggers",
        scan.items.len(),
        scan.skipped.len()
    );
    scan
}

/// Read quantity / unit value / total value from the three lines after the
/// trigger. Any missing line or parse failure abandons the trigger.
fn numeric_triple(lines: &[&str], trigger: usize) -> Option<(f64, f64, f64)> {
    let quantity = parse_decimal(lines.get(trigger + 1)?)?;
    let unit_value = parse_decimal(lines.get(trigger + 2)?)?;
    let total_value = parse_decimal(lines.get(trigger + 3)?)?;
    Some((quantity, unit_value, total_value))
}

/// Find the first line containing a letter within the bounded lookahead
/// window after the numeric triple. That line, trimmed, is the description.
fn find_description<'a>(lines: &[&'a str], trigger: usize) -> Option<&'a str> {
    for offset in 4..4 + DESCRIPTION_LOOKAHEAD {
        if let Some(candidate) = lines.get(trigger + offset) {
            let candidate = candidate.trim();
            if LETTER.is_match(candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".").trim().parse::<f64>().ok()
}
