//! Data models for extracted fiscal records.

pub mod config;
pub mod record;

pub use config::NfexConfig;
pub use record::{Header, Origin, ProductRecord, RawItem, SkipReason, SkippedItem};
