//! Stored-query execution and result export.
//!
//! Queries are authored as ordinary `user_query`-style records; the runner
//! is built once from those rows as a title→query map, executes a chosen
//! title through the data source, and hands the rendered result set to an
//! export sink on request.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use tracing::debug;
use valdesk_model::Record;

use crate::error::{EditError, ExportError};
use crate::source::DataSource;
use crate::surface::Messenger;

/// What an export sink did with the rows it was handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    Cancelled,
}

/// Downstream writer for a rendered result set. A dialog-backed sink may
/// return [`ExportOutcome::Cancelled`]; a headless sink always saves.
pub trait ExportSink {
    fn write_rows(
        &self,
        columns: &[String],
        rows: &[Record],
        suggested_filename: &str,
    ) -> Result<ExportOutcome, ExportError>;
}

/// Executes pre-validated read-only queries by title and keeps the
/// currently rendered result set.
pub struct QueryRunner {
    source: Arc<dyn DataSource>,
    messenger: Arc<dyn Messenger>,
    queries: BTreeMap<String, String>,
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl QueryRunner {
    /// Build the title→query map from stored rows. Rows missing either
    /// column are skipped; duplicate titles keep the last row's text.
    pub fn from_records(
        source: Arc<dyn DataSource>,
        messenger: Arc<dyn Messenger>,
        rows: &[Record],
        title_key: &str,
        query_key: &str,
    ) -> Self {
        let mut queries = BTreeMap::new();
        for row in rows {
            let title = row.value_or_null(title_key);
            let query = row.value_or_null(query_key);
            if title.is_blank() || query.is_blank() {
                debug!("stored query row skipped: missing title or text");
                continue;
            }
            queries.insert(title.display_string(), query.display_string());
        }
        Self {
            source,
            messenger,
            queries,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn query_text(&self, title: &str) -> Option<&str> {
        self.queries.get(title).map(String::as_str)
    }

    pub fn result_columns(&self) -> &[String] {
        &self.columns
    }

    pub fn result_rows(&self) -> &[Record] {
        &self.rows
    }

    /// Execute the stored query named `title` and replace the rendered
    /// result set. An empty result clears the display and discards the
    /// previous columns. On execution failure the previous result set is
    /// left in place.
    pub fn run(&mut self, title: &str) -> Result<(), EditError> {
        let result = self.try_run(title);
        self.surface_failure(&result);
        result
    }

    fn try_run(&mut self, title: &str) -> Result<(), EditError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(EditError::NoQuerySelected);
        }
        let query = self
            .queries
            .get(title)
            .ok_or_else(|| EditError::UnknownQuery(title.to_string()))?;
        let rows = self.source.run_query(query)?;
        self.columns = match rows.first() {
            Some(first) => first.field_names().map(str::to_string).collect(),
            None => Vec::new(),
        };
        self.rows = rows;
        Ok(())
    }

    /// Serialize exactly the rows currently rendered (no re-query) through
    /// the sink, suggesting a filename derived from the sanitized title and
    /// the current date.
    pub fn export_current(&self, title: &str, sink: &dyn ExportSink) -> Result<(), EditError> {
        let result = self.try_export(title, sink);
        self.surface_failure(&result);
        result
    }

    fn try_export(&self, title: &str, sink: &dyn ExportSink) -> Result<(), EditError> {
        if self.rows.is_empty() {
            return Err(EditError::NothingToExport);
        }
        let suggested = default_export_name(title);
        match sink.write_rows(&self.columns, &self.rows, &suggested)? {
            ExportOutcome::Saved(path) => {
                self.messenger
                    .report_info("Result Saved", &format!("Result saved to: {}", path.display()));
            }
            ExportOutcome::Cancelled => {
                self.messenger
                    .report_warning("Download Error", "No file path specified for download.");
            }
        }
        Ok(())
    }

    fn surface_failure(&self, result: &Result<(), EditError>) {
        if let Err(error) = result {
            if error.is_user_error() {
                self.messenger.report_warning("User Error", &error.to_string());
            } else {
                self.messenger
                    .report_error("Database Error", &error.to_string());
            }
        }
    }
}

/// Default export filename: sanitized title plus the current date.
pub fn default_export_name(title: &str) -> String {
    let date = Local::now().date_naive().format("%Y-%m-%d");
    format!("{}_{date}.csv", sanitize_title(title))
}

fn sanitize_title(title: &str) -> String {
    let trimmed = title.trim();
    let cleaned: String = trimmed
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    if cleaned.is_empty() {
        "query_result".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_title;

    #[test]
    fn titles_sanitize_to_filename_stems() {
        assert_eq!(sanitize_title("  All Plans "), "All_Plans");
        assert_eq!(sanitize_title("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_title("   "), "query_result");
    }
}
