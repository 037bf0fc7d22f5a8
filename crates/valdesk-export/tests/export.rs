//! CSV export: written files round-trip through a CSV reader, with null
//! cells as empty fields.

use std::path::PathBuf;

use valdesk_core::{ExportOutcome, ExportSink, default_export_name};
use valdesk_export::CsvExporter;
use valdesk_model::{Record, Value};

fn unique_temp_dir(name: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "valdesk-{}-{}-{}",
        name,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

#[test]
fn writes_header_and_rows_with_null_as_empty() {
    let dir = unique_temp_dir("csv");
    let exporter = CsvExporter::new(&dir);
    let columns = vec!["plan_id".to_string(), "plan_name".to_string()];
    let rows = vec![
        Record::new().with("plan_id", "p1").with("plan_name", "North"),
        Record::new().with("plan_id", "p2").with("plan_name", Value::Null),
    ];

    let outcome = exporter
        .write_rows(&columns, &rows, "plans_2025-01-01.csv")
        .expect("write");
    let ExportOutcome::Saved(path) = outcome else {
        panic!("headless sink always saves");
    };
    assert_eq!(path, dir.join("plans_2025-01-01.csv"));

    let mut reader = csv::Reader::from_path(&path).expect("reopen");
    let headers = reader.headers().expect("headers").clone();
    assert_eq!(&headers, &csv::StringRecord::from(vec!["plan_id", "plan_name"]));
    let records: Vec<csv::StringRecord> =
        reader.records().collect::<Result<_, _>>().expect("records");
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "North");
    assert_eq!(&records[1][1], "");

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn creates_the_output_directory_when_missing() {
    let dir = unique_temp_dir("nested").join("deeper");
    let exporter = CsvExporter::new(&dir);
    let columns = vec!["plan_id".to_string()];
    let rows = vec![Record::new().with("plan_id", "p1")];

    let outcome = exporter
        .write_rows(&columns, &rows, "out.csv")
        .expect("write");
    assert!(matches!(outcome, ExportOutcome::Saved(_)));
    assert!(dir.join("out.csv").exists());

    std::fs::remove_dir_all(dir.parent().expect("parent")).ok();
}

#[test]
fn default_name_combines_title_and_current_date() {
    let date = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    assert_eq!(
        default_export_name("Plan Totals"),
        format!("Plan_Totals_{date}.csv")
    );
}
