//! Analytics event records.

pub mod record;

pub use record::AnalyticsRecord;
