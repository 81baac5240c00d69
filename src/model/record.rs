use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

/// Canonical replacement for blank or unrecognised categorical values.
pub const EMPTY: &str = "(empty)";

/// Import-substitution status of one subsystem (OS, DBMS, virtualization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Presence {
    No,
    Yes,
    InDevelopment,
    NotUsed,
    Empty,
}

impl Presence {
    pub const ALL: [Presence; 5] = [
        Presence::No,
        Presence::Yes,
        Presence::InDevelopment,
        Presence::NotUsed,
        Presence::Empty,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::No => "No",
            Self::Yes => "Yes",
            Self::InDevelopment => "In development",
            Self::NotUsed => "Not used",
            Self::Empty => EMPTY,
        }
    }
}

/// Presence in the national software registry: a boolean with a blank state.
///
/// Kept separate from [`Presence`] so the two vocabularies never mix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RegistryPresence {
    Absent,
    Present,
    Empty,
}

impl RegistryPresence {
    pub const ALL: [RegistryPresence; 3] = [
        RegistryPresence::Absent,
        RegistryPresence::Present,
        RegistryPresence::Empty,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Absent => "Not in registry",
            Self::Present => "In registry",
            Self::Empty => EMPTY,
        }
    }
}

/// One normalized row of the inventory workbook.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryRecord {
    pub system_class: String,
    pub stage: String,
    pub status: String,
    pub landscape: String,
    pub import_target: String,
    pub registry: RegistryPresence,
    pub os: Presence,
    pub dbms: Presence,
    pub virtualization: Presence,
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub inventory_number: Option<String>,
    pub commissioning_date: Option<NaiveDate>,
    pub attributes: HashMap<String, String>, // header → value, descriptive columns
}

impl InventoryRecord {
    /// A record in `system_class` with every other field blank.
    #[must_use]
    pub fn new(system_class: impl Into<String>) -> Self {
        Self {
            system_class: system_class.into(),
            stage: EMPTY.to_string(),
            status: EMPTY.to_string(),
            landscape: EMPTY.to_string(),
            import_target: EMPTY.to_string(),
            registry: RegistryPresence::Empty,
            os: Presence::Empty,
            dbms: Presence::Empty,
            virtualization: Presence::Empty,
            name: None,
            short_name: None,
            inventory_number: None,
            commissioning_date: None,
            attributes: HashMap::new(),
        }
    }
}
