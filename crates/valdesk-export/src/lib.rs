//! CSV export sink.
//!
//! Writes a rendered result set to `<out_dir>/<suggested_filename>` with
//! the `csv` crate: one header row from the column list, then one line per
//! record with null cells serialized as empty fields. Headless by design —
//! a dialog-backed sink would return `Cancelled` when the user backs out;
//! this one always saves.

use std::path::{Path, PathBuf};

use tracing::info;
use valdesk_core::{ExportError, ExportOutcome, ExportSink};
use valdesk_model::Record;

pub struct CsvExporter {
    out_dir: PathBuf,
}

impl CsvExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }
}

impl ExportSink for CsvExporter {
    fn write_rows(
        &self,
        columns: &[String],
        rows: &[Record],
        suggested_filename: &str,
    ) -> Result<ExportOutcome, ExportError> {
        std::fs::create_dir_all(&self.out_dir).map_err(|source| ExportError::Io {
            path: self.out_dir.clone(),
            source,
        })?;
        let path = self.out_dir.join(suggested_filename);
        let mut writer = csv::Writer::from_path(&path).map_err(|error| match error.into_kind() {
            csv::ErrorKind::Io(source) => ExportError::Io {
                path: path.clone(),
                source,
            },
            other => ExportError::Message(format!("{other:?}")),
        })?;
        writer
            .write_record(columns)
            .map_err(|error| ExportError::Message(error.to_string()))?;
        for row in rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| row.value_or_null(column).display_string())
                .collect();
            writer
                .write_record(&cells)
                .map_err(|error| ExportError::Message(error.to_string()))?;
        }
        writer.flush().map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), rows = rows.len(), "result set exported");
        Ok(ExportOutcome::Saved(path))
    }
}
