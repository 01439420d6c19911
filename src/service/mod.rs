//! Business logic layer

pub mod bulk_import;

pub use bulk_import::{AdminApi, BulkImportService};
