use std::path::PathBuf;

use thiserror::Error;
use valdesk_model::ModelError;

use crate::source::SourceError;

/// Failures surfaced by the editor and query runner.
///
/// User errors abort the operation with no state change and surface as
/// warnings; everything else surfaces as an error with the edit buffer left
/// intact. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("select a record first")]
    NoSelection,

    #[error("row {0} is not in the current result set")]
    NoSuchRow(usize),

    #[error("the selected row has no complete key")]
    IncompleteKey,

    #[error("no fields to update")]
    NothingToUpdate,

    #[error("no choice {label:?} for field {field}")]
    UnknownChoice { field: String, label: String },

    #[error("{0} is not a field of this entity")]
    UnknownField(String),

    #[error("select a query to run")]
    NoQuerySelected,

    #[error("no stored query named {0:?}")]
    UnknownQuery(String),

    #[error("no query result to export")]
    NothingToExport,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl EditError {
    /// True for failures the user recovers from by adjusting input; these
    /// surface as warnings rather than errors.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            EditError::NoSelection
                | EditError::NoSuchRow(_)
                | EditError::IncompleteKey
                | EditError::NothingToUpdate
                | EditError::UnknownChoice { .. }
                | EditError::UnknownField(_)
                | EditError::NoQuerySelected
                | EditError::UnknownQuery(_)
                | EditError::NothingToExport
        )
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Message(String),
}
