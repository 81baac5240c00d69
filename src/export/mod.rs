pub mod csv;
pub mod json;

pub use crate::error::ExportError;
pub use csv::{export_csv, format_percent};
pub use json::export_json;
