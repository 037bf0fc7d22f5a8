#![deny(unsafe_code)]

use crate::{FieldSpec, ModelError, Record};

/// The ordered field layout of one entity, plus its declared key columns.
///
/// The key defaults to the first field; junction entities declare a
/// composite key spanning two or more columns. The schema is fixed once an
/// editor is built on top of it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EntitySchema {
    name: String,
    fields: Vec<FieldSpec>,
    key: Vec<String>,
}

impl EntitySchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, ModelError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ModelError::InvalidEntityName(name));
        }
        let Some(first) = fields.first() else {
            return Err(ModelError::EmptySchema(name));
        };
        let key = vec![first.name.clone()];
        Ok(Self { name, fields, key })
    }

    /// Replace the default single-column key with an explicit (possibly
    /// composite) one. Every key column must name an existing field.
    pub fn with_key<S: AsRef<str>>(mut self, columns: &[S]) -> Result<Self, ModelError> {
        let mut key = Vec::with_capacity(columns.len());
        for column in columns {
            let column = column.as_ref();
            if self.field(column).is_none() {
                return Err(ModelError::InvalidKeyColumn {
                    entity: self.name,
                    column: column.to_string(),
                });
            }
            key.push(column.to_string());
        }
        if !key.is_empty() {
            self.key = key;
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn key_columns(&self) -> &[String] {
        &self.key
    }

    pub fn is_key(&self, name: &str) -> bool {
        self.key.iter().any(|column| column == name)
    }

    pub fn has_composite_key(&self) -> bool {
        self.key.len() > 1
    }

    /// Reject records carrying fields this schema does not declare.
    pub fn validate_record(&self, record: &Record) -> Result<(), ModelError> {
        for name in record.field_names() {
            if self.field(name).is_none() {
                return Err(ModelError::UnknownField {
                    entity: self.name.clone(),
                    field: name.to_string(),
                });
            }
        }
        Ok(())
    }
}
