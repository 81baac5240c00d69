use super::{InventoryRecord, Presence, RegistryPresence};
use serde::Serialize;

/// Header of the class column in rendered and exported tables.
pub const CLASS_HEADER: &str = "System class";
/// Header of the per-class record count column.
pub const COUNT_HEADER: &str = "Systems";

/// The presence attribute a breakdown is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Target {
    Registry,
    Os,
    Dbms,
    Virtualization,
}

impl Target {
    pub const ALL: [Target; 4] = [
        Target::Registry,
        Target::Virtualization,
        Target::Dbms,
        Target::Os,
    ];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Registry => "Registry",
            Self::Os => "OS",
            Self::Dbms => "DBMS",
            Self::Virtualization => "Virtualization",
        }
    }

    /// Default declared categories, in column order.
    #[must_use]
    pub fn categories(self) -> Vec<String> {
        match self {
            Self::Registry => RegistryPresence::ALL
                .iter()
                .map(|p| p.label().to_string())
                .collect(),
            Self::Os | Self::Dbms | Self::Virtualization => Presence::ALL
                .iter()
                .map(|p| p.label().to_string())
                .collect(),
        }
    }

    /// The record's category label for this target.
    #[must_use]
    pub fn category_of(self, record: &InventoryRecord) -> &'static str {
        match self {
            Self::Registry => record.registry.label(),
            Self::Os => record.os.label(),
            Self::Dbms => record.dbms.label(),
            Self::Virtualization => record.virtualization.label(),
        }
    }
}

/// One system class of a breakdown: a share per declared category plus
/// the number of records behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub class: String,
    pub shares: Vec<f64>,
    pub count: usize,
}

/// Per-class proportional distribution across a target's categories.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownTable {
    pub categories: Vec<String>,
    pub rows: Vec<BreakdownRow>,
}

impl BreakdownTable {
    /// The "no data" table: declared columns, no rows.
    #[must_use]
    pub fn empty(categories: Vec<String>) -> Self {
        Self {
            categories,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn row(&self, class: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.class == class)
    }

    #[must_use]
    pub fn share(&self, class: &str, category: &str) -> Option<f64> {
        let column = self.categories.iter().position(|c| c == category)?;
        self.row(class).map(|r| r.shares[column])
    }

    /// Records across all rows.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.rows.iter().map(|r| r.count).sum()
    }
}
