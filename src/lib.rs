//! # Inventory Dashboard
//!
//! A terminal dashboard that summarizes an information-systems inventory by
//! import-substitution status.
//!
//! ## Features
//!
//! - Load a registry export and check it carries every inventory column
//! - Normalize presence values into fixed categories
//! - Break systems down per class for the registry, OS, DBMS and
//!   virtualization columns
//! - Filter by status, lifecycle stage, landscape and import target
//! - Export breakdowns to CSV and JSON
//!
//! ## Example
//!
//! ```no_run
//! use inventory_dashboard::engine::FilterEngine;
//! use inventory_dashboard::model::{FilterAxis, Target};
//! use inventory_dashboard::parser::{load_inventory, Vocabulary};
//!
//! let dataset = load_inventory("systems.csv", "Sheet0", &Vocabulary::default())?;
//! let mut engine = FilterEngine::new();
//! engine.set_dataset(Some(dataset));
//! engine.update_filter(FilterAxis::Stage, ["Промышленная эксплуатация"]);
//!
//! let table = engine.breakdown(Target::Os);
//! println!("{} classes", table.rows.len());
//! # Ok::<(), inventory_dashboard::error::LoadError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod model;
pub mod parser;
pub mod ui;
