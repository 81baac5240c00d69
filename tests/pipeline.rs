use inventory_dashboard::config::AppConfig;
use inventory_dashboard::engine::{EngineState, FilterEngine};
use inventory_dashboard::error::LoadError;
use inventory_dashboard::export::{export_csv, export_json};
use inventory_dashboard::model::{FilterAxis, Target, EMPTY};
use inventory_dashboard::parser::{columns, load_inventory, validate, RawTable, Vocabulary};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

/// One inventory row; unnamed columns stay blank.
fn row(values: &[(&str, &str)]) -> String {
    columns::INVENTORY
        .iter()
        .map(|column| {
            values
                .iter()
                .find(|(name, _)| name == column)
                .map_or("", |(_, v)| *v)
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn export(rows: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", columns::INVENTORY.join(";")).unwrap();
    for r in rows {
        writeln!(file, "{r}").unwrap();
    }
    file.flush().unwrap();
    file
}

fn five_systems() -> NamedTempFile {
    let sys = |class: &'static str, os: &'static str, stage: &'static str| {
        row(&[
            (columns::SYSTEM_CLASS, class),
            (columns::OS, os),
            (columns::STAGE, stage),
        ])
    };
    export(&[
        sys("A", "да", "Опытная эксплуатация"),
        sys("A", "Да", "Опытная эксплуатация"),
        sys("A", "минус", "Опытная эксплуатация"),
        sys("B", "", "Опытная эксплуатация"),
        sys("B", "разработка", "Вывод"),
    ])
}

fn loaded_engine() -> FilterEngine {
    let file = five_systems();
    let dataset = load_inventory(file.path(), "Sheet0", &Vocabulary::default()).unwrap();
    let mut engine = FilterEngine::new();
    engine.set_dataset(Some(dataset));
    engine
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.unwrap();
    assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
}

#[test]
fn unfiltered_breakdown_of_five_systems() {
    let engine = loaded_engine();
    let table = engine.breakdown(Target::Os);

    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.row("A").unwrap().count, 3);
    assert_close(table.share("A", "Yes"), 2.0 / 3.0);
    assert_close(table.share("A", "No"), 1.0 / 3.0);
    assert_close(table.share("A", "In development"), 0.0);
    assert_close(table.share("A", EMPTY), 0.0);

    assert_eq!(table.row("B").unwrap().count, 2);
    assert_close(table.share("B", "In development"), 0.5);
    assert_close(table.share("B", EMPTY), 0.5);
    assert_close(table.share("B", "Yes"), 0.0);
}

#[test]
fn stage_filter_without_matches_keeps_columns() {
    let mut engine = loaded_engine();
    engine.update_filter(FilterAxis::Stage, ["Промышленная эксплуатация"]);

    for target in Target::ALL {
        let table = engine.breakdown(target);
        assert!(table.is_empty());
        assert_eq!(table.categories, target.categories());
    }
    assert_eq!(engine.matching_records(), 0);
}

#[test]
fn stage_filter_narrows_counts() {
    let mut engine = loaded_engine();
    engine.update_filter(FilterAxis::Stage, ["Вывод"]);

    let table = engine.breakdown(Target::Os);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.row("B").unwrap().count, 1);
    assert_close(table.share("B", "In development"), 1.0);
}

#[test]
fn header_variants_are_accepted() {
    let raw = RawTable::from_rows([" budget ", "Class"], [["10", "ERP"]]);
    let table = validate(&raw, &["Budget", "Class"]).unwrap();
    assert_eq!(table.columns(), &["Budget".to_string(), "Class".to_string()]);
}

#[test]
fn each_missing_column_is_named() {
    for (i, missing) in columns::INVENTORY.iter().enumerate() {
        let headers: Vec<String> = columns::INVENTORY
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, c)| format!("  {}  ", c.to_uppercase()))
            .collect();
        let raw = RawTable::from_rows(headers, [vec!["x"; 20]]);

        let err = validate(&raw, &columns::INVENTORY).unwrap_err();
        assert_eq!(err.missing(), &[(*missing).to_string()]);
    }
}

#[test]
fn every_row_sums_to_one_and_blank_class_leads() {
    let file = export(&[
        row(&[(columns::SYSTEM_CLASS, "ERP"), (columns::REGISTRY, "1")]),
        row(&[(columns::REGISTRY, "0")]),
        row(&[(columns::SYSTEM_CLASS, "ERP"), (columns::DBMS, "не используют")]),
        row(&[(columns::SYSTEM_CLASS, "CRM"), (columns::DBMS, "нет")]),
    ]);
    let dataset = load_inventory(file.path(), "Sheet0", &Vocabulary::default()).unwrap();
    let mut engine = FilterEngine::new();
    engine.set_dataset(Some(dataset));

    for target in Target::ALL {
        let table = engine.breakdown(target);
        assert_eq!(table.rows[0].class, EMPTY);
        for r in &table.rows {
            let sum: f64 = r.shares.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "{target:?} {}: {sum}", r.class);
        }
    }
}

#[test]
fn empty_axis_matches_nothing() {
    let mut engine = loaded_engine();
    engine.update_filter(FilterAxis::Landscape, Vec::<String>::new());
    assert_eq!(engine.matching_records(), 0);

    engine.select_all(FilterAxis::Landscape);
    assert_eq!(engine.matching_records(), 5);
}

#[test]
fn load_failures_leave_engine_empty() {
    let missing = load_inventory("/no/such/inventory.csv", "Sheet0", &Vocabulary::default());
    assert!(matches!(missing, Err(LoadError::FileNotFound { .. })));

    let mut engine = loaded_engine();
    engine.set_dataset(missing.ok());
    assert_eq!(engine.state(), EngineState::Empty);
    assert!(engine.breakdown(Target::Registry).is_empty());
}

#[test]
fn exports_follow_the_breakdown() {
    let engine = loaded_engine();
    let table = engine.breakdown(Target::Os);
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("os.csv");
    export_csv(&table, &csv_path).unwrap();
    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("System class,No,Yes,In development,Not used,(empty),Systems")
    );
    assert_eq!(lines.next(), Some("A,33%,67%,0%,0%,0%,3"));
    assert_eq!(lines.next(), Some("B,0%,0%,50%,0%,50%,2"));

    let json_path = dir.path().join("os.json");
    export_json(&table, &json_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["rows"][0]["count"], 3);
}

#[test]
fn custom_vocabulary_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("app_config.json");
    std::fs::write(
        &config_path,
        r#"{ "vocabulary": { "yes": ["ок"] }, "plot_truncate_len": 12 }"#,
    )
    .unwrap();
    let config = AppConfig::load(&config_path).unwrap();
    assert_eq!(config.plot_truncate_len, 12);

    let file = export(&[row(&[(columns::SYSTEM_CLASS, "ERP"), (columns::OS, "ОК")])]);
    let dataset = load_inventory(file.path(), "Sheet0", &config.vocabulary).unwrap();
    let mut engine = FilterEngine::new();
    engine.set_dataset(Some(dataset));

    assert_close(engine.breakdown(Target::Os).share("ERP", "Yes"), 1.0);
}

#[test]
fn import_target_filter_combines_with_stage() {
    let sys = |class: &'static str, target: &'static str, stage: &'static str| {
        row(&[
            (columns::SYSTEM_CLASS, class),
            (columns::IMPORT_TARGET, target),
            (columns::STAGE, stage),
            (columns::REGISTRY, "1"),
        ])
    };
    let file = export(&[
        sys("ERP", "1С:ERP", "Опытная эксплуатация"),
        sys("ERP", "", "Опытная эксплуатация"),
        sys("CRM", "1С:ERP", "Вывод"),
    ]);
    let dataset = load_inventory(file.path(), "Sheet0", &Vocabulary::default()).unwrap();
    let mut engine = FilterEngine::new();
    engine.set_dataset(Some(dataset));
    assert_eq!(engine.options(FilterAxis::ImportTarget), &["1С:ERP", EMPTY]);

    engine.update_filter(FilterAxis::ImportTarget, ["1С:ERP"]);
    let table = engine.breakdown(Target::Registry);
    assert_eq!(engine.matching_records(), 2);
    assert_eq!(table.total_count(), 2);
    assert_eq!(table.row("ERP").unwrap().count, 1);
    assert_eq!(table.row("CRM").unwrap().count, 1);

    engine.update_filter(FilterAxis::Stage, ["Опытная эксплуатация"]);
    let table = engine.breakdown(Target::Registry);
    assert_eq!(engine.matching_records(), 1);
    assert!(table.row("CRM").is_none());

    engine.update_filter(FilterAxis::ImportTarget, [EMPTY]);
    assert_eq!(engine.matching_records(), 1);
    assert_close(engine.breakdown(Target::Registry).share("ERP", "In registry"), 1.0);
}

#[test]
fn workbook_export_loads_from_its_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("inventory.xlsx");
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet0").unwrap();
    let rows: [&[(&str, &str)]; 2] = [
        &[(columns::SYSTEM_CLASS, "ERP"), (columns::DBMS, "да")],
        &[(columns::SYSTEM_CLASS, "ERP"), (columns::DBMS, "нет")],
    ];
    for (c, header) in columns::INVENTORY.iter().enumerate() {
        worksheet.write_string(0, c as u16, *header).unwrap();
        for (r, values) in rows.iter().enumerate() {
            if let Some((_, value)) = values.iter().find(|(name, _)| name == header) {
                worksheet.write_string(r as u32 + 1, c as u16, *value).unwrap();
            }
        }
    }
    let registry = columns::INVENTORY
        .iter()
        .position(|c| *c == columns::REGISTRY)
        .unwrap();
    worksheet.write_number(1, registry as u16, 1.0).unwrap();
    workbook.save(&path).unwrap();

    let dataset = load_inventory(&path, "Sheet0", &Vocabulary::default()).unwrap();
    let mut engine = FilterEngine::new();
    engine.set_dataset(Some(dataset));

    let dbms = engine.breakdown(Target::Dbms);
    assert_close(dbms.share("ERP", "Yes"), 0.5);
    assert_close(dbms.share("ERP", "No"), 0.5);
    assert_close(engine.breakdown(Target::Registry).share("ERP", "In registry"), 0.5);
}
