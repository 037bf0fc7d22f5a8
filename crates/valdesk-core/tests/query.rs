//! Query runner behavior: stored-query lookup, result replacement, and
//! export handoff.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;

use valdesk_core::{
    DataSource, EditError, ExportError, ExportOutcome, ExportSink, Messenger, QueryRunner,
    SourceError, default_export_name,
};
use valdesk_model::{Record, Value};

struct CannedSource {
    results: RefCell<Vec<Result<Vec<Record>, SourceError>>>,
    executed: RefCell<Vec<String>>,
}

impl CannedSource {
    fn new(results: Vec<Result<Vec<Record>, SourceError>>) -> Self {
        Self {
            results: RefCell::new(results),
            executed: RefCell::new(Vec::new()),
        }
    }
}

impl DataSource for CannedSource {
    fn get_fields(&self, _entity: &str) -> Result<Vec<String>, SourceError> {
        Ok(Vec::new())
    }

    fn fetch_all(&self, _entity: &str) -> Result<Vec<Record>, SourceError> {
        Ok(Vec::new())
    }

    fn insert(&self, _entity: &str, _record: Record) -> Result<(), SourceError> {
        unreachable!("query runner never inserts");
    }

    fn update(
        &self,
        _entity: &str,
        _patch: &Record,
        _condition: &Record,
    ) -> Result<usize, SourceError> {
        unreachable!("query runner never updates");
    }

    fn delete(&self, _entity: &str, _condition: &Record) -> Result<usize, SourceError> {
        unreachable!("query runner never deletes");
    }

    fn run_query(&self, text: &str) -> Result<Vec<Record>, SourceError> {
        self.executed.borrow_mut().push(text.to_string());
        self.results.borrow_mut().remove(0)
    }
}

#[derive(Default)]
struct Recorder {
    warnings: RefCell<Vec<String>>,
    errors: RefCell<Vec<String>>,
    infos: RefCell<Vec<String>>,
}

impl Messenger for Recorder {
    fn report_error(&self, _title: &str, message: &str) {
        self.errors.borrow_mut().push(message.to_string());
    }

    fn report_warning(&self, _title: &str, message: &str) {
        self.warnings.borrow_mut().push(message.to_string());
    }

    fn report_info(&self, _title: &str, message: &str) {
        self.infos.borrow_mut().push(message.to_string());
    }
}

#[derive(Default)]
struct CaptureSink {
    captured: RefCell<Option<(Vec<String>, Vec<Record>, String)>>,
    cancel: bool,
}

impl ExportSink for CaptureSink {
    fn write_rows(
        &self,
        columns: &[String],
        rows: &[Record],
        suggested_filename: &str,
    ) -> Result<ExportOutcome, ExportError> {
        *self.captured.borrow_mut() = Some((
            columns.to_vec(),
            rows.to_vec(),
            suggested_filename.to_string(),
        ));
        if self.cancel {
            Ok(ExportOutcome::Cancelled)
        } else {
            Ok(ExportOutcome::Saved(PathBuf::from(suggested_filename)))
        }
    }
}

fn stored_queries() -> Vec<Record> {
    vec![
        Record::new()
            .with("query_title", "All Plans")
            .with("query_string", "SELECT * FROM plan"),
        Record::new()
            .with("query_title", "Broken")
            .with("query_string", "SELECT nothing FROM nowhere"),
        // Missing text: skipped at build time.
        Record::new().with("query_title", "Incomplete"),
    ]
}

fn runner(
    results: Vec<Result<Vec<Record>, SourceError>>,
) -> (QueryRunner, Arc<CannedSource>, Arc<Recorder>) {
    let source = Arc::new(CannedSource::new(results));
    let recorder = Arc::new(Recorder::default());
    let runner = QueryRunner::from_records(
        source.clone(),
        recorder.clone(),
        &stored_queries(),
        "query_title",
        "query_string",
    );
    (runner, source, recorder)
}

fn plan_rows() -> Vec<Record> {
    vec![
        Record::new().with("plan_id", "p1").with("plan_name", "North"),
        Record::new().with("plan_id", "p2").with("plan_name", Value::Null),
    ]
}

#[test]
fn map_is_built_from_complete_rows_only() {
    let (runner, _, _) = runner(Vec::new());
    let titles: Vec<&str> = runner.titles().collect();
    assert_eq!(titles, ["All Plans", "Broken"]);
    assert_eq!(runner.query_text("All Plans"), Some("SELECT * FROM plan"));
}

#[test]
fn run_replaces_the_rendered_result_set() {
    let (mut runner, source, _) = runner(vec![Ok(plan_rows())]);
    runner.run("All Plans").expect("run");
    assert_eq!(source.executed.borrow().as_slice(), ["SELECT * FROM plan"]);
    assert_eq!(runner.result_columns(), ["plan_id", "plan_name"]);
    assert_eq!(runner.result_rows().len(), 2);
}

#[test]
fn empty_result_clears_columns_and_rows() {
    let (mut runner, _, _) = runner(vec![Ok(plan_rows()), Ok(Vec::new())]);
    runner.run("All Plans").expect("run");
    assert!(!runner.result_columns().is_empty());
    runner.run("All Plans").expect("run again");
    assert!(runner.result_columns().is_empty());
    assert!(runner.result_rows().is_empty());
}

#[test]
fn blank_and_unknown_titles_are_user_errors() {
    let (mut runner, source, recorder) = runner(Vec::new());
    assert!(matches!(runner.run("  "), Err(EditError::NoQuerySelected)));
    assert!(matches!(
        runner.run("Missing"),
        Err(EditError::UnknownQuery(_))
    ));
    assert!(source.executed.borrow().is_empty());
    assert_eq!(recorder.warnings.borrow().len(), 2);
}

#[test]
fn execution_failure_keeps_the_previous_result() {
    let (mut runner, _, recorder) = runner(vec![
        Ok(plan_rows()),
        Err(SourceError::InvalidQuery("bad".to_string())),
    ]);
    runner.run("All Plans").expect("run");
    let result = runner.run("Broken");
    assert!(matches!(result, Err(EditError::Source(_))));
    assert_eq!(runner.result_rows().len(), 2);
    assert_eq!(runner.result_columns(), ["plan_id", "plan_name"]);
    assert_eq!(recorder.errors.borrow().len(), 1);
}

#[test]
fn export_hands_over_exactly_the_rendered_rows() {
    let (mut runner, source, recorder) = runner(vec![Ok(plan_rows())]);
    runner.run("All Plans").expect("run");

    let sink = CaptureSink::default();
    runner.export_current("All Plans", &sink).expect("export");

    // No re-query happened for the export.
    assert_eq!(source.executed.borrow().len(), 1);
    let captured = sink.captured.borrow();
    let (columns, rows, suggested) = captured.as_ref().expect("sink called");
    assert_eq!(columns.as_slice(), ["plan_id", "plan_name"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(suggested, &default_export_name("All Plans"));
    assert!(suggested.starts_with("All_Plans_"));
    assert!(suggested.ends_with(".csv"));
    assert_eq!(recorder.infos.borrow().len(), 1);
}

#[test]
fn export_with_no_result_never_calls_the_sink() {
    let (runner, _, recorder) = runner(Vec::new());
    let sink = CaptureSink::default();
    let result = runner.export_current("All Plans", &sink);
    assert!(matches!(result, Err(EditError::NothingToExport)));
    assert!(sink.captured.borrow().is_none());
    assert_eq!(recorder.warnings.borrow().len(), 1);
}

#[test]
fn cancelled_export_is_reported_as_a_warning() {
    let (mut runner, _, recorder) = runner(vec![Ok(plan_rows())]);
    runner.run("All Plans").expect("run");
    let sink = CaptureSink {
        cancel: true,
        ..CaptureSink::default()
    };
    runner.export_current("All Plans", &sink).expect("cancel is not an error");
    assert_eq!(recorder.warnings.borrow().len(), 1);
    assert!(recorder.infos.borrow().is_empty());
}
