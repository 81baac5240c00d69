pub mod breakdown;
pub mod dataset;
pub mod filter;
pub mod record;

pub use breakdown::{BreakdownRow, BreakdownTable, Target, CLASS_HEADER, COUNT_HEADER};
pub use dataset::InventoryDataset;
pub use filter::{FilterAxis, FilterSelection};
pub use record::{InventoryRecord, Presence, RegistryPresence, EMPTY};
