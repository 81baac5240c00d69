use crate::error::ExportError;
use crate::model::breakdown::{CLASS_HEADER, COUNT_HEADER};
use crate::model::BreakdownTable;
use std::fs::File;
use std::path::Path;

/// Renders a proportion as a whole percent, e.g. `0.667` as `67%`.
#[must_use]
pub fn format_percent(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

pub fn export_csv<P: AsRef<Path>>(table: &BreakdownTable, path: P) -> Result<(), ExportError> {
    let path_ref = path.as_ref();
    let file = File::create(path_ref).map_err(|source| ExportError::FileCreate {
        path: path_ref.to_path_buf(),
        source,
    })?;

    let mut writer = csv::Writer::from_writer(file);

    let mut header = vec![CLASS_HEADER.to_string()];
    header.extend(table.categories.iter().cloned());
    header.push(COUNT_HEADER.to_string());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.class.clone()];
        record.extend(row.shares.iter().map(|&s| format_percent(s)));
        record.push(row.count.to_string());
        writer.write_record(&record)?;
    }

    writer.flush().map_err(|e| ExportError::WriteError {
        message: e.to_string(),
    })?;

    Ok(())
}
