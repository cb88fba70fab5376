//! Regex patterns for header extraction from Brazilian invoice text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Issuing company: an uppercase/alphanumeric run of at least 5
    /// characters ending in a legal-entity suffix (LTDA, EIRELI, ME).
    pub static ref COMPANY: Regex = Regex::new(
        r"(?i)([A-Z0-9\s\.\-&]{5,}(LTDA|EIRELI|ME|M[EÉ]))"
    ).unwrap();

    /// CNPJ (national tax id): 14 digits with optional separator
    /// punctuation, e.g. `12.345.678/0001-99`.
    pub static ref CNPJ: Regex = Regex::new(
        r"\d{2}[.,]?\d{3}[.,]?\d{3}/?\d{4}-?\d{2}"
    ).unwrap();

    /// Brazilian date token, `DD/MM/YYYY`.
    pub static ref DATE_BR: Regex = Regex::new(
        r"\d{2}/\d{2}/\d{4}"
    ).unwrap();

    /// A Latin letter, including the accented forms the OCR model emits.
    /// Used to tell a wrapped description line from numeric columns.
    pub static ref LETTER: Regex = Regex::new(
        r"[a-zA-Záéíóúçãõâêô]"
    ).unwrap();
}
