//! The bundled `DataSource` implementation.
//!
//! Tables live in memory behind a mutex and are written to one JSON
//! document after every successful mutation, mirroring a
//! commit-per-statement database. Entity layout comes from the catalog;
//! the store is schema-checked on every write.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, info};
use valdesk_core::{DataSource, SourceError};
use valdesk_model::{EntitySchema, Record, Value, short_id};

use crate::catalog::{default_catalog, starter_queries};
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::select::{SelectStatement, validate_text};

#[derive(Debug, Default)]
struct Tables {
    rows: BTreeMap<String, Vec<Record>>,
}

pub struct MemoryStore {
    schemas: BTreeMap<String, EntitySchema>,
    tables: Mutex<Tables>,
    data_file: Option<PathBuf>,
}

impl MemoryStore {
    /// An unpersisted store over an explicit catalog.
    pub fn with_catalog(catalog: Vec<EntitySchema>) -> Self {
        let schemas = catalog
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema))
            .collect();
        Self {
            schemas,
            tables: Mutex::new(Tables::default()),
            data_file: None,
        }
    }

    /// Open the store over the default catalog, loading any existing data
    /// file from the configured directory.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        config.ensure_data_dir()?;
        let mut store = Self::with_catalog(default_catalog()?);
        let path = config.data_file();
        if path.exists() {
            let text =
                std::fs::read_to_string(&path).map_err(|source| StoreError::io(&path, source))?;
            let rows: BTreeMap<String, Vec<Record>> =
                serde_json::from_str(&text).map_err(|source| StoreError::Data {
                    path: path.clone(),
                    source,
                })?;
            store.tables = Mutex::new(Tables { rows });
            debug!(path = %path.display(), "data file loaded");
        }
        store.data_file = Some(path);
        Ok(store)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &EntitySchema> {
        self.schemas.values()
    }

    pub fn schema(&self, entity: &str) -> Option<&EntitySchema> {
        self.schemas.get(entity)
    }

    /// Seed starter stored queries when the `user_query` table is empty.
    pub fn seed_starter_queries(&self) -> Result<usize, SourceError> {
        let existing = self.fetch_all("user_query")?;
        if !existing.is_empty() {
            return Ok(0);
        }
        let rows = starter_queries();
        let count = rows.len();
        for row in rows {
            self.insert("user_query", row)?;
        }
        info!(count, "starter queries seeded");
        Ok(count)
    }

    fn schema_for(&self, entity: &str) -> Result<&EntitySchema, SourceError> {
        self.schemas
            .get(entity)
            .ok_or_else(|| SourceError::UnknownEntity(entity.to_string()))
    }

    fn check_columns(&self, schema: &EntitySchema, record: &Record) -> Result<(), SourceError> {
        for name in record.field_names() {
            if schema.field(name).is_none() {
                return Err(SourceError::UnknownColumn {
                    entity: schema.name().to_string(),
                    column: name.to_string(),
                });
            }
        }
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, SourceError> {
        self.tables
            .lock()
            .map_err(|_| SourceError::Backend("store lock poisoned".to_string()))
    }

    fn persist(&self, tables: &Tables) -> Result<(), SourceError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let text = serde_json::to_string_pretty(&tables.rows)
            .map_err(|error| SourceError::Backend(error.to_string()))?;
        std::fs::write(path, text)
            .map_err(|error| SourceError::Backend(format!("{}: {error}", path.display())))
    }
}

fn matches_condition(row: &Record, condition: &Record) -> bool {
    condition
        .iter()
        .all(|(name, value)| row.value_or_null(name).key_string() == value.key_string())
}

impl DataSource for MemoryStore {
    fn get_fields(&self, entity: &str) -> Result<Vec<String>, SourceError> {
        let schema = self.schema_for(entity)?;
        Ok(schema.field_names().map(str::to_string).collect())
    }

    fn fetch_all(&self, entity: &str) -> Result<Vec<Record>, SourceError> {
        let schema = self.schema_for(entity)?;
        let tables = self.lock()?;
        Ok(tables.rows.get(schema.name()).cloned().unwrap_or_default())
    }

    fn insert(&self, entity: &str, record: Record) -> Result<(), SourceError> {
        let schema = self.schema_for(entity)?;
        self.check_columns(schema, &record)?;
        let mut full = Record::new();
        for field in schema.fields() {
            let value = record.value_or_null(&field.name);
            let value = if value.is_blank() {
                if schema.is_key(&field.name) {
                    Value::Text(short_id())
                } else {
                    Value::Null
                }
            } else {
                value
            };
            full.set(&field.name, value);
        }
        let mut tables = self.lock()?;
        tables
            .rows
            .entry(schema.name().to_string())
            .or_default()
            .push(full);
        self.persist(&tables)
    }

    fn update(
        &self,
        entity: &str,
        patch: &Record,
        condition: &Record,
    ) -> Result<usize, SourceError> {
        let schema = self.schema_for(entity)?;
        self.check_columns(schema, patch)?;
        self.check_columns(schema, condition)?;
        let mut effective = Record::new();
        for (name, value) in patch.iter() {
            if !schema.is_key(name) {
                effective.set(name, value.clone());
            }
        }
        if effective.is_empty() {
            return Err(SourceError::EmptyUpdate(entity.to_string()));
        }
        if condition.is_empty() {
            return Err(SourceError::EmptyCondition(entity.to_string()));
        }
        let mut tables = self.lock()?;
        let mut touched = 0;
        if let Some(rows) = tables.rows.get_mut(schema.name()) {
            for row in rows.iter_mut() {
                if matches_condition(row, condition) {
                    for (name, value) in effective.iter() {
                        row.set(name, value.clone());
                    }
                    touched += 1;
                }
            }
        }
        if touched > 0 {
            self.persist(&tables)?;
        }
        Ok(touched)
    }

    fn delete(&self, entity: &str, condition: &Record) -> Result<usize, SourceError> {
        let schema = self.schema_for(entity)?;
        self.check_columns(schema, condition)?;
        if condition.is_empty() {
            return Err(SourceError::EmptyCondition(entity.to_string()));
        }
        let mut tables = self.lock()?;
        let mut removed = 0;
        if let Some(rows) = tables.rows.get_mut(schema.name()) {
            let before = rows.len();
            rows.retain(|row| !matches_condition(row, condition));
            removed = before - rows.len();
        }
        if removed > 0 {
            self.persist(&tables)?;
        }
        Ok(removed)
    }

    fn run_query(&self, text: &str) -> Result<Vec<Record>, SourceError> {
        validate_text(text)?;
        let statement = SelectStatement::parse(text)?;
        let schema = self.schema_for(&statement.table)?;
        let rows = {
            let tables = self.lock()?;
            tables.rows.get(schema.name()).cloned().unwrap_or_default()
        };
        statement.evaluate(schema, &rows)
    }
}
