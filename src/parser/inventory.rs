use super::loader::load_spreadsheet;
use super::normalize::{normalize, Vocabulary};
use super::schema::{columns, validate};
use crate::error::LoadError;
use crate::model::InventoryDataset;
use std::path::Path;
use tracing::{info, warn};

/// Sheet name of the registry export.
pub const DEFAULT_SHEET: &str = "Sheet0";

/// Loads an inventory export and turns it into a dataset.
///
/// Runs the full pipeline:
/// - reads the delimited export
/// - checks every inventory column is present
/// - normalizes categories and presence values with `vocabulary`
///
/// # Arguments
///
/// * `path` - Path to the exported sheet
/// * `sheet` - Sheet name recorded with the data
/// * `vocabulary` - Tokens recognised in the presence columns
///
/// # Errors
///
/// Returns [`LoadError::Schema`] if required columns are missing, and the
/// loader's errors for missing, empty or unreadable files.
///
/// # Example
///
/// ```no_run
/// use inventory_dashboard::parser::{load_inventory, Vocabulary};
///
/// let dataset = load_inventory("systems.csv", "Sheet0", &Vocabulary::default())?;
/// println!("{} systems", dataset.len());
/// # Ok::<(), inventory_dashboard::error::LoadError>(())
/// ```
pub fn load_inventory<P: AsRef<Path>>(
    path: P,
    sheet: &str,
    vocabulary: &Vocabulary,
) -> Result<InventoryDataset, LoadError> {
    let result = load_spreadsheet(&path, sheet)
        .and_then(|raw| validate(&raw, &columns::INVENTORY).map_err(LoadError::from))
        .map(|table| normalize(&table, vocabulary));

    match &result {
        Ok(dataset) => info!(
            source = %dataset.source,
            records = dataset.len(),
            classes = dataset.total_classes(),
            "inventory loaded"
        ),
        Err(e) => warn!(path = %path.as_ref().display(), error = %e, "inventory load failed"),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Presence, RegistryPresence};
    use std::io::Write;

    #[test]
    fn loads_a_workbook_export() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let header = columns::INVENTORY.join(";");
        writeln!(file, "{header};Лишний столбец").unwrap();

        let mut row = vec![""; columns::INVENTORY.len()];
        let set = |row: &mut Vec<&str>, name: &str, value: &'static str| {
            let i = columns::INVENTORY.iter().position(|c| *c == name).unwrap();
            row[i] = value;
        };
        set(&mut row, columns::SYSTEM_CLASS, "ERP");
        set(&mut row, columns::REGISTRY, "1");
        set(&mut row, columns::OS, "нет");
        writeln!(file, "{};x", row.join(";")).unwrap();

        let dataset = load_inventory(file.path(), DEFAULT_SHEET, &Vocabulary::default()).unwrap();

        assert_eq!(dataset.len(), 1);
        let record = &dataset.records()[0];
        assert_eq!(record.system_class, "ERP");
        assert_eq!(record.registry, RegistryPresence::Present);
        assert_eq!(record.os, Presence::No);
        assert!(!record.attributes.contains_key("Лишний столбец"));
    }

    #[test]
    fn missing_columns_fail_with_schema_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", columns::INVENTORY[..20].join(",")).unwrap();
        writeln!(file, "{}", vec!["v"; 20].join(",")).unwrap();

        let err = load_inventory(file.path(), DEFAULT_SHEET, &Vocabulary::default()).unwrap_err();
        match err {
            LoadError::Schema(schema) => {
                assert_eq!(schema.missing(), &[columns::IMPORT_TARGET.to_string()]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }
}
