//! Record normalization: header merge, defaults, provenance tagging.

use chrono::{Local, NaiveDate};

use super::xml::XmlExtraction;
use crate::models::record::{Header, Origin, ProductRecord, RawItem, UNKNOWN_COMPANY};

/// Per-request tenant context. Passed explicitly into normalization and
/// storage calls; there is no process-wide tenant state.
#[derive(Debug, Clone)]
pub struct TenantContext {
    /// The authenticated tenant's own tax id (CNPJ), digits only. Used as
    /// fallback when a document header carries none.
    pub tax_id: String,
}

impl TenantContext {
    pub fn new(tax_id: impl Into<String>) -> Self {
        Self {
            tax_id: normalize_tax_id(&tax_id.into()),
        }
    }
}

/// Strip all non-digit characters from a tax identifier.
pub fn normalize_tax_id(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Merges header fields into raw items and applies the documented
/// defaults. Records leaving the normalizer are final: nothing in this
/// core mutates them afterwards.
#[derive(Debug, Clone)]
pub struct Normalizer {
    today: NaiveDate,
}

impl Normalizer {
    /// Normalizer using the current processing date for date fallbacks.
    pub fn new() -> Self {
        Self {
            today: Local::now().date_naive(),
        }
    }

    /// Pin the processing date, for deterministic tests.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Complete records from a structured XML extraction. The schema
    /// timestamp is carried verbatim as the record date.
    pub fn normalize_xml(
        &self,
        extraction: &XmlExtraction,
        ctx: &TenantContext,
    ) -> Vec<ProductRecord> {
        extraction
            .items
            .iter()
            .map(|item| {
                self.finish(
                    ProductRecord {
                        company: extraction.company.clone(),
                        tax_id: extraction.tax_id.clone(),
                        product: item.product.clone(),
                        quantity: item.quantity,
                        unit_value: item.unit_value,
                        total_value: item.total_value,
                        origin: Origin::Xml,
                        date: extraction.issued_at.clone(),
                    },
                    ctx,
                )
            })
            .collect()
    }

    /// Complete records from a heuristic scan plus the independently
    /// recovered header. Dates are formatted as ISO `YYYY-MM-DD` so the
    /// dedup key stays stable across documents of one invoice run.
    pub fn normalize_pdf(
        &self,
        items: &[RawItem],
        header: &Header,
        ctx: &TenantContext,
    ) -> Vec<ProductRecord> {
        let date = header
            .date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        items
            .iter()
            .map(|item| {
                self.finish(
                    ProductRecord {
                        company: header.company.clone().unwrap_or_default(),
                        tax_id: header.tax_id.clone().unwrap_or_default(),
                        product: item.product.clone(),
                        quantity: item.quantity,
                        unit_value: item.unit_value,
                        total_value: item.total_value,
                        origin: Origin::Pdf,
                        date: date.clone(),
                    },
                    ctx,
                )
            })
            .collect()
    }

    /// Apply the default policy to one record. Idempotent: a record that
    /// already went through normalization passes through unchanged.
    pub fn finish(&self, mut record: ProductRecord, ctx: &TenantContext) -> ProductRecord {
        if record.company.trim().is_empty() {
            record.company = UNKNOWN_COMPANY.to_string();
        }
        if record.tax_id.is_empty() {
            record.tax_id = ctx.tax_id.clone();
        }
        if record.date.is_empty() {
            record.date = self.today.format("%Y-%m-%d").to_string();
        }
        if !record.quantity.is_finite() {
            record.quantity = 1.0;
        }
        record
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx() -> TenantContext {
        TenantContext::new("98.765.432/0001-10")
    }

    fn normalizer() -> Normalizer {
        Normalizer::with_today(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
    }

    fn item() -> RawItem {
        RawItem {
            product: "Caneta azul BIC".to_string(),
            quantity: 3.0,
            unit_value: 10.50,
            total_value: 31.50,
        }
    }

    #[test]
    fn tax_id_digit_normalization() {
        assert_eq!(normalize_tax_id("12.345.678/0001-99"), "12345678000199");
        assert_eq!(normalize_tax_id("12345678000199"), "12345678000199");
    }

    #[test]
    fn tenant_context_normalizes_its_own_tax_id() {
        assert_eq!(ctx().tax_id, "98765432000110");
    }

    #[test]
    fn pdf_records_prefer_document_header() {
        let header = Header {
            company: Some("MERCADO BOM PRECO LTDA".to_string()),
            tax_id: Some("12345678000199".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 3, 10),
        };
        let records = normalizer().normalize_pdf(&[item()], &header, &ctx());

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.company, "MERCADO BOM PRECO LTDA");
        assert_eq!(record.tax_id, "12345678000199");
        assert_eq!(record.date, "2024-03-10");
        assert_eq!(record.origin, Origin::Pdf);
    }

    #[test]
    fn missing_header_falls_back_to_defaults() {
        let records = normalizer().normalize_pdf(&[item()], &Header::default(), &ctx());

        let record = &records[0];
        assert_eq!(record.company, UNKNOWN_COMPANY);
        assert_eq!(record.tax_id, "98765432000110");
        assert_eq!(record.date, "2024-03-15");
    }

    #[test]
    fn normalization_is_idempotent() {
        let records = normalizer().normalize_pdf(&[item()], &Header::default(), &ctx());
        let once = records[0].clone();
        let twice = normalizer().finish(once.clone(), &ctx());
        assert_eq!(once, twice);
    }

    #[test]
    fn xml_records_keep_schema_timestamp_verbatim() {
        let extraction = XmlExtraction {
            company: "Mercado Bom Preco LTDA".to_string(),
            tax_id: "12345678000199".to_string(),
            issued_at: "2024-03-10T14:32:00-03:00".to_string(),
            items: vec![item()],
            skipped: Vec::new(),
        };
        let records = normalizer().normalize_xml(&extraction, &ctx());

        assert_eq!(records[0].date, "2024-03-10T14:32:00-03:00");
        assert_eq!(records[0].origin, Origin::Xml);
        assert_eq!(records[0].tax_id, "12345678000199");
    }

    #[test]
    fn xml_record_without_issuer_uses_tenant_and_today() {
        let extraction = XmlExtraction {
            company: UNKNOWN_COMPANY.to_string(),
            tax_id: String::new(),
            issued_at: String::new(),
            items: vec![item()],
            skipped: Vec::new(),
        };
        let records = normalizer().normalize_xml(&extraction, &ctx());

        assert_eq!(records[0].company, UNKNOWN_COMPANY);
        assert_eq!(records[0].tax_id, "98765432000110");
        assert_eq!(records[0].date, "2024-03-15");
    }

    #[test]
    fn non_finite_quantity_defaults_to_one() {
        let record = ProductRecord {
            company: "X LTDA".to_string(),
            tax_id: "1".to_string(),
            product: "item".to_string(),
            quantity: f64::NAN,
            unit_value: 1.0,
            total_value: 1.0,
            origin: Origin::Pdf,
            date: "2024-01-01".to_string(),
        };
        let record = normalizer().finish(record, &ctx());
        assert_eq!(record.quantity, 1.0);
    }
}
