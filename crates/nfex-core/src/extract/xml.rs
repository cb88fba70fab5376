//! Structured extractor for NF-e XML invoices.

use roxmltree::{Document, Node};
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::models::record::{RawItem, SkipReason, SkippedItem, UNKNOWN_COMPANY};

/// The NF-e schema namespace.
pub const NFE_NAMESPACE: &str = "http://www.portalfiscal.inf.br/nfe";

/// Header fields and line items read from one NF-e document.
#[derive(Debug, Clone)]
pub struct XmlExtraction {
    /// Issuer display name; [`UNKNOWN_COMPANY`] when the element is absent.
    pub company: String,
    /// Issuer CNPJ as printed in the document; empty when absent.
    pub tax_id: String,
    /// Issuance timestamp (`dhEmi`) verbatim; empty when absent.
    pub issued_at: String,
    /// Extracted line items, in document order.
    pub items: Vec<RawItem>,
    /// Line items dropped due to per-item failures.
    pub skipped: Vec<SkippedItem>,
}

impl XmlExtraction {
    fn empty() -> Self {
        Self {
            company: UNKNOWN_COMPANY.to_string(),
            tax_id: String::new(),
            issued_at: String::new(),
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Parse an NF-e XML document into header fields plus line items.
///
/// A document whose `NFe` root element is missing yields an empty
/// extraction rather than an error; a malformed XML container is fatal for
/// the document. Individual items with unparseable numeric fields or a
/// missing description are skipped and recorded, never fatal.
pub fn extract_nfe(xml: &str) -> Result<XmlExtraction, ExtractionError> {
    let doc = Document::parse(xml).map_err(|e| ExtractionError::Document(e.to_string()))?;

    let Some(root) = doc
        .descendants()
        .find(|n| n.has_tag_name((NFE_NAMESPACE, "NFe")))
    else {
        warn!("XML document has no NFe root element in the fiscal namespace");
        return Ok(XmlExtraction::empty());
    };

    let mut extraction = XmlExtraction::empty();

    if let Some(emit) = find_descendant(root, "emit") {
        if let Some(name) = descendant_text(emit, "xNome") {
            extraction.company = name.to_string();
        }
        if let Some(cnpj) = descendant_text(emit, "CNPJ") {
            extraction.tax_id = cnpj.to_string();
        }
    }

    // Issuance timestamp is kept verbatim, no reformatting.
    if let Some(ide) = find_descendant(root, "ide") {
        if let Some(issued) = descendant_text(ide, "dhEmi") {
            extraction.issued_at = issued.to_string();
        }
    }

    for (ordinal, det) in root
        .descendants()
        .filter(|n| n.has_tag_name((NFE_NAMESPACE, "det")))
        .enumerate()
    {
        let name = descendant_text(det, "xProd").unwrap_or_default();

        let quantity = parse_decimal(descendant_text(det, "qCom").unwrap_or("0"));
        let unit_value = parse_decimal(descendant_text(det, "vUnCom").unwrap_or("0"));
        let total_value = parse_decimal(descendant_text(det, "vProd").unwrap_or("0"));

        let (Some(quantity), Some(unit_value), Some(total_value)) =
            (quantity, unit_value, total_value)
        else {
            debug!("skipping item {}: unparseable numeric field", ordinal);
            extraction.skipped.push(SkippedItem {
                reason: SkipReason::BadNumber,
                position: ordinal,
                source: name.to_string(),
            });
            continue;
        };

        if name.is_empty() {
            debug!("skipping item {}: no description", ordinal);
            extraction.skipped.push(SkippedItem {
                reason: SkipReason::MissingDescription,
                position: ordinal,
                source: String::new(),
            });
            continue;
        }

        extraction.items.push(RawItem {
            product: name.to_string(),
            quantity,
            unit_value,
            total_value,
        });
    }

    debug!(
        "NF-e extraction: {} items, {} skipped",
        extraction.items.len(),
        extraction.skipped.len()
    );
    Ok(extraction)
}

fn find_descendant<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.descendants()
        .find(|n| n.has_tag_name((NFE_NAMESPACE, name)))
}

fn descendant_text<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    find_descendant(node, name).and_then(|n| n.text())
}

/// Parse a schema decimal, accepting a comma decimal separator.
fn parse_decimal(raw: &str) -> Option<f64> {
    raw.replace(',', ".").trim().parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nfe(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<nfeProc xmlns="{NFE_NAMESPACE}">
  <NFe>
    <infNFe>
      <ide><dhEmi>2024-03-10T14:32:00-03:00</dhEmi></ide>
      <emit><xNome>Mercado Bom Preco LTDA</xNome><CNPJ>12345678000199</CNPJ></emit>
      {body}
    </infNFe>
  </NFe>
</nfeProc>"#
        )
    }

    fn det(name: &str, qty: &str, unit: &str, total: &str) -> String {
        format!(
            "<det><prod><xProd>{name}</xProd><qCom>{qty}</qCom>\
             <vUnCom>{unit}</vUnCom><vProd>{total}</vProd></prod></det>"
        )
    }

    #[test]
    fn extracts_all_valid_items() {
        let xml = nfe(&format!(
            "{}{}",
            det("Caneta azul", "3", "10,50", "31,50"),
            det("Caderno", "2", "8.00", "16.00"),
        ));
        let extraction = extract_nfe(&xml).unwrap();

        assert_eq!(extraction.company, "Mercado Bom Preco LTDA");
        assert_eq!(extraction.tax_id, "12345678000199");
        assert_eq!(extraction.issued_at, "2024-03-10T14:32:00-03:00");
        assert_eq!(extraction.items.len(), 2);
        assert!(extraction.skipped.is_empty());

        assert_eq!(extraction.items[0].quantity, 3.0);
        assert_eq!(extraction.items[0].unit_value, 10.50);
        assert_eq!(extraction.items[0].total_value, 31.50);
    }

    #[test]
    fn malformed_quantity_skips_only_that_item() {
        let xml = nfe(&format!(
            "{}{}",
            det("Caneta azul", "tres", "10,50", "31,50"),
            det("Caderno", "2", "8,00", "16,00"),
        ));
        let extraction = extract_nfe(&xml).unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].product, "Caderno");
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, SkipReason::BadNumber);
        assert_eq!(extraction.skipped[0].position, 0);
    }

    #[test]
    fn item_without_description_is_skipped() {
        let xml = nfe(&det("", "1", "5,00", "5,00"));
        let extraction = extract_nfe(&xml).unwrap();

        assert!(extraction.items.is_empty());
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, SkipReason::MissingDescription);
    }

    #[test]
    fn missing_root_yields_empty_extraction() {
        let xml = r#"<?xml version="1.0"?><other xmlns="urn:not-nfe"><a/></other>"#;
        let extraction = extract_nfe(xml).unwrap();

        assert_eq!(extraction.company, UNKNOWN_COMPANY);
        assert_eq!(extraction.tax_id, "");
        assert!(extraction.items.is_empty());
    }

    #[test]
    fn missing_issuer_defaults() {
        let xml = format!(
            r#"<NFe xmlns="{NFE_NAMESPACE}"><infNFe>{}</infNFe></NFe>"#,
            det("Sabonete", "1", "2,50", "2,50"),
        );
        let extraction = extract_nfe(&xml).unwrap();

        assert_eq!(extraction.company, UNKNOWN_COMPANY);
        assert_eq!(extraction.tax_id, "");
        assert_eq!(extraction.issued_at, "");
        assert_eq!(extraction.items.len(), 1);
    }

    #[test]
    fn malformed_container_is_fatal() {
        assert!(extract_nfe("<NFe><unclosed>").is_err());
    }

    #[test]
    fn missing_numeric_elements_default_to_zero() {
        let xml = nfe("<det><prod><xProd>Item sem valores</xProd></prod></det>");
        let extraction = extract_nfe(&xml).unwrap();

        assert_eq!(extraction.items.len(), 1);
        assert_eq!(extraction.items[0].quantity, 0.0);
        assert_eq!(extraction.items[0].total_value, 0.0);
    }
}
