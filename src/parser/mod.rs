pub mod inventory;
pub mod loader;
pub mod normalize;
pub mod schema;

pub use crate::error::{LoadError, SchemaError};
pub use inventory::load_inventory;
pub use loader::{load_spreadsheet, RawTable};
pub use normalize::{normalize, Vocabulary};
pub use schema::{columns, validate, ValidatedTable};
