use super::InventoryRecord;
use serde::Serialize;
use std::collections::BTreeSet;

/// The four independent filter axes of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterAxis {
    Status,
    Stage,
    Landscape,
    ImportTarget,
}

impl FilterAxis {
    pub const ALL: [FilterAxis; 4] = [
        FilterAxis::Status,
        FilterAxis::Stage,
        FilterAxis::Landscape,
        FilterAxis::ImportTarget,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Status => "Target architecture status",
            Self::Stage => "Lifecycle stage",
            Self::Landscape => "IT landscape",
            Self::ImportTarget => "Import-substitution target",
        }
    }

    /// The record's value on this axis.
    #[must_use]
    pub fn value_of(self, record: &InventoryRecord) -> &str {
        match self {
            Self::Status => &record.status,
            Self::Stage => &record.stage,
            Self::Landscape => &record.landscape,
            Self::ImportTarget => &record.import_target,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Stage => 1,
            Self::Landscape => 2,
            Self::ImportTarget => 3,
        }
    }
}

/// Selected values per axis.
///
/// `None` on an axis means "no constraint"; `Some` with an empty set
/// excludes every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSelection {
    axes: [Option<BTreeSet<String>>; 4],
}

impl FilterSelection {
    /// A selection that lets every record through.
    #[must_use]
    pub fn unconstrained() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn axis(&self, axis: FilterAxis) -> Option<&BTreeSet<String>> {
        self.axes[axis.index()].as_ref()
    }

    pub fn set(&mut self, axis: FilterAxis, values: Option<BTreeSet<String>>) {
        self.axes[axis.index()] = values;
    }

    /// Builder form of [`FilterSelection::set`] with an explicit value set.
    #[must_use]
    pub fn with<I, S>(mut self, axis: FilterAxis, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(axis, Some(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Conjunction of the four membership tests.
    #[must_use]
    pub fn matches(&self, record: &InventoryRecord) -> bool {
        FilterAxis::ALL.iter().all(|&axis| match self.axis(axis) {
            None => true,
            Some(selected) => selected.contains(axis.value_of(record)),
        })
    }
}
