//! Command implementations: wire the store, editors, query runner, and
//! export sink together behind the CLI surface.
//!
//! Editor and runner failures are surfaced through the messenger before
//! they return, so commands translate them into exit codes without
//! printing twice.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use tracing::{error, info, warn};
use valdesk_core::{
    ConfirmPrompt, DataSource, EditError, Messenger, QueryRunner, RecordEditor,
};
use valdesk_export::CsvExporter;
use valdesk_model::{EntitySchema, FieldKind, Record, Value};
use valdesk_store::{MemoryStore, StoreConfig};

use crate::cli::{AddArgs, DeleteArgs, EntityArgs, ExportArgs, QueryArgs, UpdateArgs};

/// Messenger that writes to the terminal and mirrors onto the log.
struct TermMessenger;

impl Messenger for TermMessenger {
    fn report_error(&self, title: &str, message: &str) {
        eprintln!("error: {title}: {message}");
        error!("{title}: {message}");
    }

    fn report_warning(&self, title: &str, message: &str) {
        eprintln!("warning: {title}: {message}");
        warn!("{title}: {message}");
    }

    fn report_info(&self, title: &str, message: &str) {
        println!("{title}: {message}");
        info!("{title}: {message}");
    }
}

/// Yes/no prompt on stdin; `--yes` answers without asking.
struct StdinPrompt {
    assume_yes: bool,
}

impl ConfirmPrompt for StdinPrompt {
    fn confirm(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{title}: {message} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

struct AppContext {
    config: StoreConfig,
    store: Arc<MemoryStore>,
    messenger: Arc<TermMessenger>,
}

impl AppContext {
    fn open(config_path: Option<&std::path::Path>) -> anyhow::Result<Self> {
        let config = StoreConfig::resolve(config_path).context("resolve configuration")?;
        let store = MemoryStore::open(&config)
            .with_context(|| format!("open store in {}", config.data_dir.display()))?;
        Ok(Self {
            config,
            store: Arc::new(store),
            messenger: Arc::new(TermMessenger),
        })
    }

    fn editor(&self, entity: &str, assume_yes: bool) -> anyhow::Result<RecordEditor> {
        let schema = self
            .store
            .schema(entity)
            .with_context(|| format!("unknown entity: {entity}"))?
            .clone();
        Ok(RecordEditor::new(
            schema,
            self.store.clone(),
            self.messenger.clone(),
            Arc::new(StdinPrompt { assume_yes }),
        ))
    }

    fn query_runner(&self) -> anyhow::Result<QueryRunner> {
        let stored = self
            .store
            .fetch_all("user_query")
            .context("load stored queries")?;
        Ok(QueryRunner::from_records(
            self.store.clone(),
            self.messenger.clone(),
            &stored,
            "query_title",
            "query_string",
        ))
    }
}

pub fn run_init(config_path: Option<&std::path::Path>) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let seeded = context
        .store
        .seed_starter_queries()
        .context("seed starter queries")?;
    println!("Data directory: {}", context.config.data_dir.display());
    if seeded > 0 {
        println!("Seeded {seeded} starter queries.");
    }
    Ok(0)
}

pub fn run_entities(config_path: Option<&std::path::Path>) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut table = new_table(vec![
        "Entity".to_string(),
        "Key".to_string(),
        "Fields".to_string(),
    ]);
    for schema in context.store.schemas() {
        table.add_row(vec![
            schema.name().to_string(),
            schema.key_columns().join(", "),
            schema.fields().len().to_string(),
        ]);
    }
    println!("{table}");
    Ok(0)
}

pub fn run_list(config_path: Option<&std::path::Path>, args: &EntityArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut editor = context.editor(&args.entity, false)?;
    if editor.refresh().is_err() {
        return Ok(1);
    }
    let mut table = new_table(editor.columns());
    for row in editor.display_rows() {
        table.add_row(row);
    }
    println!("{table}");
    println!("{} record(s)", editor.rows().len());
    Ok(0)
}

pub fn run_add(config_path: Option<&std::path::Path>, args: &AddArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut editor = context.editor(&args.entity, false)?;
    let partial = record_from_pairs(editor.schema(), &args.set)?;
    if editor.add_record(partial).is_err() {
        return Ok(1);
    }
    println!("Record added to {}.", args.entity);
    Ok(0)
}

pub fn run_update(config_path: Option<&std::path::Path>, args: &UpdateArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut editor = context.editor(&args.entity, false)?;
    if editor.bind_references().is_err() || editor.refresh().is_err() {
        return Ok(1);
    }
    let condition = record_from_pairs(editor.schema(), &args.conditions)?;
    if editor.select_by_key(&condition).is_err() {
        return Ok(1);
    }
    stage_pairs(&mut editor, &args.set)?;
    if editor.update().is_err() {
        return Ok(1);
    }
    println!("Record updated in {}.", args.entity);
    Ok(0)
}

pub fn run_delete(config_path: Option<&std::path::Path>, args: &DeleteArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut editor = context.editor(&args.entity, args.yes)?;
    if editor.refresh().is_err() {
        return Ok(1);
    }
    let condition = record_from_pairs(editor.schema(), &args.conditions)?;
    if editor.select_by_key(&condition).is_err() || editor.delete().is_err() {
        return Ok(1);
    }
    println!("Delete finished for {}.", args.entity);
    Ok(0)
}

pub fn run_queries(config_path: Option<&std::path::Path>) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let stored = context
        .store
        .fetch_all("user_query")
        .context("load stored queries")?;
    let mut table = new_table(vec![
        "Title".to_string(),
        "Description".to_string(),
        "Purpose".to_string(),
    ]);
    for row in &stored {
        table.add_row(vec![
            row.value_or_null("query_title").display_string(),
            row.value_or_null("query_description").display_string(),
            row.value_or_null("query_purpose").display_string(),
        ]);
    }
    println!("{table}");
    Ok(0)
}

pub fn run_query(config_path: Option<&std::path::Path>, args: &QueryArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut runner = context.query_runner()?;
    if runner.run(&args.title).is_err() {
        return Ok(1);
    }
    if runner.result_rows().is_empty() {
        println!("(no rows)");
        return Ok(0);
    }
    let mut table = new_table(runner.result_columns().to_vec());
    for row in runner.result_rows() {
        let cells: Vec<String> = runner
            .result_columns()
            .iter()
            .map(|column| row.value_or_null(column).display_string())
            .collect();
        table.add_row(cells);
    }
    println!("{table}");
    println!("{} row(s)", runner.result_rows().len());
    Ok(0)
}

pub fn run_export(config_path: Option<&std::path::Path>, args: &ExportArgs) -> anyhow::Result<i32> {
    let context = AppContext::open(config_path)?;
    let mut runner = context.query_runner()?;
    if runner.run(&args.title).is_err() {
        return Ok(1);
    }
    let out_dir = args.out.clone().unwrap_or_else(|| PathBuf::from("."));
    let exporter = CsvExporter::new(out_dir);
    if runner.export_current(&args.title, &exporter).is_err() {
        return Ok(1);
    }
    Ok(0)
}

fn new_table(headers: Vec<String>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers);
    table
}

/// Parse repeated `field=value` arguments into a record, coercing each
/// value to the field's kind.
fn record_from_pairs(schema: &EntitySchema, pairs: &[String]) -> anyhow::Result<Record> {
    let mut record = Record::new();
    for pair in pairs {
        let (field, raw) = split_pair(pair)?;
        record.set(field, coerce_value(schema, field, raw)?);
    }
    Ok(record)
}

/// Stage `field=value` assignments into the edit buffer, going through the
/// binder for reference fields so labels and ids stay in sync. Reference
/// values are given as stored ids and resolved to their bound labels.
fn stage_pairs(editor: &mut RecordEditor, pairs: &[String]) -> anyhow::Result<()> {
    let schema = editor.schema().clone();
    for pair in pairs {
        let (field, raw) = split_pair(pair)?;
        let Some(spec) = schema.field(field) else {
            bail!("{field} is not a field of {}", schema.name());
        };
        match spec.kind {
            FieldKind::Text => editor.set_text(field, raw).map_err(stage_error)?,
            FieldKind::Flag => editor.set_flag(field, parse_flag(raw)).map_err(stage_error)?,
            FieldKind::Date => {
                let date = if raw.trim().is_empty() {
                    None
                } else {
                    let parsed = chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                        .with_context(|| format!("{field}: expected YYYY-MM-DD, got {raw:?}"))?;
                    Some(parsed)
                };
                editor.set_date(field, date).map_err(stage_error)?;
            }
            FieldKind::Reference => {
                if raw.trim().is_empty() {
                    editor.clear_field(field).map_err(stage_error)?;
                    continue;
                }
                let label = editor
                    .binder()
                    .resolve_label_from_id(field, &Value::Text(raw.trim().to_string()));
                if label.is_empty() {
                    bail!("{field}: no record with id {raw:?}");
                }
                editor.choose(field, &label).map_err(stage_error)?;
            }
        }
    }
    Ok(())
}

fn stage_error(error: EditError) -> anyhow::Error {
    anyhow::anyhow!(error.to_string())
}

fn split_pair(pair: &str) -> anyhow::Result<(&str, &str)> {
    match pair.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => Ok((field.trim(), value)),
        _ => bail!("expected FIELD=VALUE, got {pair:?}"),
    }
}

fn coerce_value(schema: &EntitySchema, field: &str, raw: &str) -> anyhow::Result<Value> {
    let Some(spec) = schema.field(field) else {
        bail!("{field} is not a field of {}", schema.name());
    };
    if raw.trim().is_empty() {
        return Ok(Value::Null);
    }
    let value = match spec.kind {
        FieldKind::Text | FieldKind::Reference => Value::Text(raw.trim().to_string()),
        FieldKind::Flag => Value::Flag(parse_flag(raw)),
        FieldKind::Date => {
            let date = chrono::NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .with_context(|| format!("{field}: expected YYYY-MM-DD, got {raw:?}"))?;
            Value::Date(date)
        }
    };
    Ok(value)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use valdesk_store::default_catalog;

    fn schema(entity: &str) -> EntitySchema {
        default_catalog()
            .expect("catalog")
            .into_iter()
            .find(|schema| schema.name() == entity)
            .expect("entity")
    }

    #[test]
    fn pairs_split_on_the_first_equals() {
        assert_eq!(split_pair("a=b").unwrap(), ("a", "b"));
        assert_eq!(split_pair("a=b=c").unwrap(), ("a", "b=c"));
        assert!(split_pair("no-equals").is_err());
        assert!(split_pair("=empty-name").is_err());
    }

    #[test]
    fn values_coerce_by_field_kind() {
        let metric = schema("metric");
        assert_eq!(
            coerce_value(&metric, "metric_name", "Revenue").unwrap(),
            Value::Text("Revenue".to_string())
        );
        assert_eq!(
            coerce_value(&metric, "is_plan_level", "yes").unwrap(),
            Value::Flag(true)
        );
        assert_eq!(coerce_value(&metric, "metric_name", "  ").unwrap(), Value::Null);
        assert!(coerce_value(&metric, "bogus", "x").is_err());

        let initiative = schema("initiative");
        assert!(coerce_value(&initiative, "planned_start_date", "not-a-date").is_err());
        assert_eq!(
            coerce_value(&initiative, "planned_start_date", "2025-06-01").unwrap(),
            Value::Date(chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
        );
    }
}
