//! CSV ingestion into the `users` and `orders` tables.

mod import;
pub mod record;
pub use import::{
    analyze, load_files, load_orders, load_users, verify, AnalysisReport, LoadReport,
    QualityReport, StatusShare, TableReport,
};
pub use record::{parse_timestamp, RowError};
