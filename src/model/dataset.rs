use super::{FilterAxis, InventoryRecord};
use serde::Serialize;
use std::collections::HashSet;

/// Ordered, immutable collection of inventory records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct InventoryDataset {
    pub source: String,
    records: Vec<InventoryRecord>,
}

impl InventoryDataset {
    #[must_use]
    pub fn new(source: impl Into<String>, records: Vec<InventoryRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[InventoryRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values on `axis` in first-seen order.
    #[must_use]
    pub fn distinct(&self, axis: FilterAxis) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .map(|r| axis.value_of(r))
            .filter(|v| seen.insert(*v))
            .map(str::to_string)
            .collect()
    }

    /// Number of distinct system classes.
    #[must_use]
    pub fn total_classes(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.system_class.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
