/// Data layer: delimited-file ingestion.
///
/// Architecture:
/// ```text
///  .csv / .txt (any single-char delimiter)
///        │
///        ▼
///   ┌───────────────┐
///   │ TabularDataStore │  header → field names, rows → raw columns,
///   └───────────────┘    optional unit row, comma-decimal cleaning
///        │
///        ▼
///   named numeric vectors + unit labels, served by field name
/// ```
pub mod store;

pub use store::{LoadOptions, TabularDataStore};
