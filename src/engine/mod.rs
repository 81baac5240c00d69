pub mod aggregate;
pub mod filter_engine;

pub use aggregate::aggregate;
pub use filter_engine::{EngineState, FilterEngine, Recompute};
