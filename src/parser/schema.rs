use super::loader::RawTable;
use crate::error::SchemaError;

/// Headers of the inventory workbook, as the registry export spells them.
pub mod columns {
    pub const COMMISSIONING_DATE: &str = "Дата ввода в эксплуатацию";
    pub const LANDSCAPE: &str = "ИТ-ландшафт / Наименование";
    pub const INVENTORY_NUMBER: &str = "Инвентарный номер";
    pub const SYSTEM_CLASS: &str = "Класс ИС ИМЗ / Наименование";
    pub const CLASS_KPI: &str = "КПЭ по классу в 2024";
    pub const SHORT_NAME: &str = "Краткое наименование";
    pub const NAME: &str = "Наименование";
    pub const IMPORT_PLAN: &str = "План импортозамещения";
    pub const BUDGET: &str = "Бюджет";
    pub const REGISTRY: &str = "Наличие в реестре Мин связи российского ПО";
    pub const DESCRIPTION: &str = "Описание";
    pub const OS: &str = "Наличие ИМЗ ОС";
    pub const DBMS: &str = "Наличие ИМЗ СУБД";
    pub const VIRTUALIZATION: &str = "Наличие ИМЗ виртуализации";
    pub const DEVELOPMENT_OWNER: &str = "Ответственный за развитие / ФИО";
    pub const COMMISSIONING_ORDER: &str = "Приказ о вводе в эксплуатацию";
    pub const STATUS: &str = "Статус принадлежности к целевой архитектуре / Наименование";
    pub const TECHNICAL_OWNER: &str = "Технический владелец / ФИО";
    pub const STAGE: &str = "Этап ЖЦ / Наименование";
    pub const CLASS_CODE: &str = "Код класса";
    pub const IMPORT_TARGET: &str = "Целевая ИС для задач импортозамещения";

    /// Every column the dashboard requires.
    pub const INVENTORY: [&str; 21] = [
        COMMISSIONING_DATE,
        LANDSCAPE,
        INVENTORY_NUMBER,
        SYSTEM_CLASS,
        CLASS_KPI,
        SHORT_NAME,
        NAME,
        IMPORT_PLAN,
        BUDGET,
        REGISTRY,
        DESCRIPTION,
        OS,
        DBMS,
        VIRTUALIZATION,
        DEVELOPMENT_OWNER,
        COMMISSIONING_ORDER,
        STATUS,
        TECHNICAL_OWNER,
        STAGE,
        CLASS_CODE,
        IMPORT_TARGET,
    ];
}

/// A table holding exactly the required columns, in required order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedTable {
    pub source: String,
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ValidatedTable {
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Position of `name`, matched the same way headers are validated.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let key = header_key(name);
        self.columns.iter().position(|c| header_key(c) == key)
    }
}

/// Checks that `raw` carries every `required` column.
///
/// Header matching ignores case and surrounding whitespace. The result keeps
/// only the required columns, named by the trimmed required names.
///
/// # Errors
///
/// Returns [`SchemaError::MissingColumns`] listing every absent column with
/// its required-name casing, in the order `required` gives them.
pub fn validate<S: AsRef<str>>(
    raw: &RawTable,
    required: &[S],
) -> Result<ValidatedTable, SchemaError> {
    let header_keys: Vec<String> = raw.headers.iter().map(|h| header_key(h)).collect();

    let mut positions = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for name in required {
        let name = name.as_ref();
        let key = header_key(name);
        // first matching header wins when the source repeats a column
        match header_keys.iter().position(|h| *h == key) {
            Some(index) => positions.push(index),
            None => missing.push(name.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { missing });
    }

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            positions
                .iter()
                .map(|&i| row.get(i).cloned().flatten())
                .collect()
        })
        .collect();

    Ok(ValidatedTable {
        source: raw.source.clone(),
        columns: required.iter().map(|n| n.as_ref().trim().to_string()).collect(),
        rows,
    })
}

fn header_key(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_lowercase()
}
