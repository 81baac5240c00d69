use crate::error::LoadError;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use std::path::Path;
use tracing::debug;

/// A rectangular table as read from disk, before any validation.
///
/// Whitespace-only cells are stored as `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub source: String,
    pub sheet: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Builds a table from string literals; blank cells become `None`.
    #[must_use]
    pub fn from_rows<H, R, C>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            source: String::new(),
            sheet: String::new(),
            headers: headers.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| cell(c.as_ref())).collect())
                .collect(),
        }
    }
}

/// Reads an inventory export: an Excel or OpenDocument workbook, or a
/// delimited text file.
///
/// Workbooks (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`, `.ods`) are opened with
/// calamine and `sheet` selects the worksheet by name. Anything else is read
/// as CSV, which holds a single sheet; `sheet` is then only recorded on the
/// table. The CSV delimiter is `;` when the header line has more semicolons
/// than commas, which is what spreadsheet tools emit in comma-decimal
/// locales.
///
/// # Errors
///
/// Returns [`LoadError::FileNotFound`] if the path does not exist,
/// [`LoadError::EmptyData`] if there is no header or no data row,
/// [`LoadError::Parse`] if the content is not a readable table or the
/// workbook has no sheet named `sheet`, and [`LoadError::FileRead`] for
/// any other I/O failure.
pub fn load_spreadsheet<P: AsRef<Path>>(path: P, sheet: &str) -> Result<RawTable, LoadError> {
    let path_ref = path.as_ref();
    let mut table = if is_workbook(path_ref) {
        read_workbook(path_ref, sheet)?
    } else {
        read_delimited(path_ref)?
    };

    if table.headers.iter().all(String::is_empty) || table.rows.is_empty() {
        return Err(LoadError::EmptyData {
            path: path_ref.to_path_buf(),
        });
    }

    table.source = path_ref.to_string_lossy().to_string();
    table.sheet = sheet.to_string();
    debug!(
        source = %table.source,
        sheet,
        columns = table.headers.len(),
        rows = table.rows.len(),
        "spreadsheet read"
    );
    Ok(table)
}

fn is_workbook(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|w| w.eq_ignore_ascii_case(ext))
        })
}

const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

fn read_delimited(path: &Path) -> Result<RawTable, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| io_error(path, source))?;
    parse_table(&bytes).map_err(|message| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

fn read_workbook(path: &Path, sheet: &str) -> Result<RawTable, LoadError> {
    let parse = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let mut workbook = open_workbook_auto(path).map_err(|e| match e {
        calamine::Error::Io(source) => io_error(path, source),
        other => parse(other.to_string()),
    })?;

    let names = workbook.sheet_names();
    if !names.iter().any(|name| name == sheet) {
        return Err(parse(format!(
            "no sheet named '{sheet}' (available: {})",
            names.join(", ")
        )));
    }
    let range = workbook
        .worksheet_range(sheet)
        .map_err(|e| parse(e.to_string()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| {
            row.iter()
                .map(|c| workbook_cell(c).unwrap_or_default())
                .collect()
        })
        .unwrap_or_default();

    let rows = rows
        .map(|row| {
            let mut cells: Vec<Option<String>> = row.iter().map(workbook_cell).collect();
            cells.resize(headers.len(), None);
            cells
        })
        .filter(|cells| cells.iter().any(Option::is_some))
        .collect();

    Ok(RawTable {
        headers,
        rows,
        ..RawTable::default()
    })
}

// Dates come back as text the normalizer parses; errors read as blank.
fn workbook_cell(value: &Data) -> Option<String> {
    match value {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => cell(s),
        Data::DateTime(_) => value
            .as_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        other => cell(&other.to_string()),
    }
}

fn io_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == std::io::ErrorKind::NotFound {
        LoadError::FileNotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::FileRead {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn parse_table(bytes: &[u8]) -> Result<RawTable, String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(sniff_delimiter(bytes))
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let mut row: Vec<Option<String>> = record.iter().map(cell).collect();
        row.resize(headers.len(), None);
        rows.push(row);
    }

    Ok(RawTable {
        headers,
        rows,
        ..RawTable::default()
    })
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    let semicolons = header_line.iter().filter(|&&b| b == b';').count();
    let commas = header_line.iter().filter(|&&b| b == b',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

fn cell(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
