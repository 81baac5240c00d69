use super::schema::{columns, ValidatedTable};
use crate::model::{InventoryDataset, InventoryRecord, Presence, RegistryPresence, EMPTY};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw tokens recognised in the presence columns.
///
/// Tokens are compared trimmed and case-insensitively. Anything not listed
/// becomes the blank category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Vocabulary {
    pub yes: Vec<String>,
    pub no: Vec<String>,
    pub in_development: Vec<String>,
    pub not_used: Vec<String>,
    pub registry_present: Vec<String>,
    pub registry_absent: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        fn tokens(list: &[&str]) -> Vec<String> {
            list.iter().map(|t| (*t).to_string()).collect()
        }
        Self {
            yes: tokens(&["да", "yes"]),
            no: tokens(&["нет", "минус", "no", "minus"]),
            in_development: tokens(&["в разработке", "разработка", "in development", "development"]),
            not_used: tokens(&["не используют", "not used"]),
            registry_present: tokens(&["1", "1.0", "true"]),
            registry_absent: tokens(&["0", "0.0", "false"]),
        }
    }
}

impl Vocabulary {
    #[must_use]
    pub fn presence(&self, raw: Option<&str>) -> Presence {
        let Some(value) = raw.map(token) else {
            return Presence::Empty;
        };
        if listed(&self.yes, &value) {
            Presence::Yes
        } else if listed(&self.no, &value) {
            Presence::No
        } else if listed(&self.in_development, &value) {
            Presence::InDevelopment
        } else if listed(&self.not_used, &value) {
            Presence::NotUsed
        } else {
            Presence::Empty
        }
    }

    #[must_use]
    pub fn registry(&self, raw: Option<&str>) -> RegistryPresence {
        let Some(value) = raw.map(token) else {
            return RegistryPresence::Empty;
        };
        if listed(&self.registry_present, &value) {
            RegistryPresence::Present
        } else if listed(&self.registry_absent, &value) {
            RegistryPresence::Absent
        } else {
            RegistryPresence::Empty
        }
    }
}

fn token(value: &str) -> String {
    value.trim().to_lowercase()
}

fn listed(tokens: &[String], value: &str) -> bool {
    tokens.iter().any(|t| token(t) == value)
}

/// Columns that become typed record fields; the rest go to `attributes`.
const TYPED_COLUMNS: [&str; 13] = [
    columns::SYSTEM_CLASS,
    columns::STAGE,
    columns::STATUS,
    columns::LANDSCAPE,
    columns::IMPORT_TARGET,
    columns::REGISTRY,
    columns::OS,
    columns::DBMS,
    columns::VIRTUALIZATION,
    columns::NAME,
    columns::SHORT_NAME,
    columns::INVENTORY_NUMBER,
    columns::COMMISSIONING_DATE,
];

/// Turns a validated inventory table into records.
///
/// Never fails: absent columns and unrecognised values both end up as the
/// blank category.
#[must_use]
pub fn normalize(table: &ValidatedTable, vocabulary: &Vocabulary) -> InventoryDataset {
    let index: HashMap<&str, usize> = TYPED_COLUMNS
        .iter()
        .filter_map(|&name| table.column_index(name).map(|i| (name, i)))
        .collect();

    let descriptive: Vec<(usize, &String)> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(i, _)| !index.values().any(|typed| typed == i))
        .collect();

    let records = table
        .rows()
        .iter()
        .map(|row| {
            let raw = |name: &str| cell(row, &index, name);
            let category = |name: &str| raw(name).unwrap_or(EMPTY).to_string();

            InventoryRecord {
                system_class: category(columns::SYSTEM_CLASS),
                stage: category(columns::STAGE),
                status: category(columns::STATUS),
                landscape: category(columns::LANDSCAPE),
                import_target: category(columns::IMPORT_TARGET),
                registry: vocabulary.registry(raw(columns::REGISTRY)),
                os: vocabulary.presence(raw(columns::OS)),
                dbms: vocabulary.presence(raw(columns::DBMS)),
                virtualization: vocabulary.presence(raw(columns::VIRTUALIZATION)),
                name: raw(columns::NAME).map(str::to_string),
                short_name: raw(columns::SHORT_NAME).map(str::to_string),
                inventory_number: raw(columns::INVENTORY_NUMBER).map(str::to_string),
                commissioning_date: raw(columns::COMMISSIONING_DATE).and_then(parse_date),
                attributes: descriptive
                    .iter()
                    .filter_map(|&(i, name)| {
                        row.get(i)
                            .and_then(Option::as_deref)
                            .map(|v| (name.clone(), v.trim().to_string()))
                    })
                    .collect(),
            }
        })
        .collect();

    InventoryDataset::new(table.source.clone(), records)
}

fn cell<'a>(row: &'a [Option<String>], index: &HashMap<&str, usize>, name: &str) -> Option<&'a str> {
    index
        .get(name)
        .and_then(|&i| row.get(i))
        .and_then(|v| v.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d.%m.%Y"))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}
