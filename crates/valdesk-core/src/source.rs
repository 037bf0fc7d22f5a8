//! The data-source seam.
//!
//! Editors and the query runner talk to storage only through [`DataSource`].
//! Any backing implementation works: the bundled in-process store, a SQL
//! server, or a test double.

use thiserror::Error;
use valdesk_model::Record;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    #[error("unknown column {column} in entity {entity}")]
    UnknownColumn { entity: String, column: String },

    #[error("update for {0} carries no columns")]
    EmptyUpdate(String),

    #[error("condition for {0} carries no columns")]
    EmptyCondition(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("query contains forbidden keyword {0:?}")]
    ForbiddenKeyword(String),

    #[error("storage failure: {0}")]
    Backend(String),
}

/// Generic CRUD plus ad-hoc read-only query execution.
///
/// Implementations take `&self`; a shared handle is used from one thread at
/// a time, so interior mutability is the implementation's concern. Every
/// call is its own atomic unit; no client-side transaction scoping exists
/// at this seam.
pub trait DataSource {
    /// Ordered column names of an entity.
    fn get_fields(&self, entity: &str) -> Result<Vec<String>, SourceError>;

    /// Every row of an entity, in storage order.
    fn fetch_all(&self, entity: &str) -> Result<Vec<Record>, SourceError>;

    /// Insert one record. Blank key columns are filled by the source.
    fn insert(&self, entity: &str, record: Record) -> Result<(), SourceError>;

    /// Apply a sparse patch to every row matching the conjunctive
    /// `condition`. Returns the number of rows touched.
    fn update(&self, entity: &str, patch: &Record, condition: &Record)
    -> Result<usize, SourceError>;

    /// Delete every row matching the conjunctive `condition`. Returns the
    /// number of rows removed.
    fn delete(&self, entity: &str, condition: &Record) -> Result<usize, SourceError>;

    /// Execute a read-only query string. Fails with
    /// [`SourceError::InvalidQuery`] or [`SourceError::ForbiddenKeyword`]
    /// on malformed or disallowed text.
    fn run_query(&self, text: &str) -> Result<Vec<Record>, SourceError>;
}
