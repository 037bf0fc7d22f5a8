//! Generic record editor: one instance per entity drives the full
//! add/update/delete/refresh/select cycle against an injected data source.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;
use valdesk_model::{EntitySchema, FieldKind, Record, Value, short_id};

use crate::binder::ChoiceBinder;
use crate::error::EditError;
use crate::source::DataSource;
use crate::surface::{ConfirmPrompt, Messenger};

/// The staged edit-buffer representation of one field, by kind.
///
/// A flag counts as blank when unchecked: an unset checkbox stores `Null`
/// on add and is excluded from update patches.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldInput {
    Text(String),
    Choice(Option<String>),
    Flag(bool),
    Date(Option<NaiveDate>),
}

impl FieldInput {
    fn empty_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Text => FieldInput::Text(String::new()),
            FieldKind::Reference => FieldInput::Choice(None),
            FieldKind::Flag => FieldInput::Flag(false),
            FieldKind::Date => FieldInput::Date(None),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldInput::Text(text) => text.trim().is_empty(),
            FieldInput::Choice(choice) => choice.is_none(),
            FieldInput::Flag(flag) => !flag,
            FieldInput::Date(date) => date.is_none(),
        }
    }
}

/// Create/read/update/delete controller for one entity.
///
/// Collaborators are injected at construction; the editor never reaches for
/// process-wide state. Failed operations are surfaced through the messenger
/// (warnings for user errors, errors otherwise) before the `Err` is
/// returned, and always leave the edit buffer intact.
pub struct RecordEditor {
    schema: EntitySchema,
    source: Arc<dyn DataSource>,
    messenger: Arc<dyn Messenger>,
    prompt: Arc<dyn ConfirmPrompt>,
    binder: ChoiceBinder,
    buffer: BTreeMap<String, FieldInput>,
    rows: Vec<Record>,
    selected: Option<usize>,
}

impl RecordEditor {
    pub fn new(
        schema: EntitySchema,
        source: Arc<dyn DataSource>,
        messenger: Arc<dyn Messenger>,
        prompt: Arc<dyn ConfirmPrompt>,
    ) -> Self {
        let buffer = schema
            .fields()
            .iter()
            .map(|field| (field.name.clone(), FieldInput::empty_for(field.kind)))
            .collect();
        Self {
            schema,
            source,
            messenger,
            prompt,
            binder: ChoiceBinder::new(),
            buffer,
            rows: Vec::new(),
            selected: None,
        }
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn entity(&self) -> &str {
        self.schema.name()
    }

    pub fn binder(&self) -> &ChoiceBinder {
        &self.binder
    }

    /// Bind (or rebuild) one choice slot per reference field from the
    /// referenced entities' current rows. Called once after construction
    /// and again whenever a referenced entity's records change.
    pub fn bind_references(&mut self) -> Result<(), EditError> {
        let result = self.try_bind_references();
        self.surface_failure(&result);
        result
    }

    fn try_bind_references(&mut self) -> Result<(), EditError> {
        for field in self.schema.fields().to_vec() {
            let Some(reference) = field.reference else {
                continue;
            };
            let rows = self.source.fetch_all(&reference.entity)?;
            if self.binder.has_slot(&field.name) {
                self.binder.refresh(
                    &field.name,
                    &rows,
                    &reference.id_column,
                    &reference.label_column,
                );
            } else {
                self.binder.bind(
                    &field.name,
                    &rows,
                    &reference.id_column,
                    &reference.label_column,
                );
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Edit buffer access
    // ------------------------------------------------------------------

    pub fn input(&self, field: &str) -> Option<&FieldInput> {
        self.buffer.get(field)
    }

    pub fn set_text(&mut self, field: &str, text: impl Into<String>) -> Result<(), EditError> {
        self.stage(field, FieldInput::Text(text.into()))
    }

    pub fn set_flag(&mut self, field: &str, flag: bool) -> Result<(), EditError> {
        self.stage(field, FieldInput::Flag(flag))
    }

    pub fn set_date(&mut self, field: &str, date: Option<NaiveDate>) -> Result<(), EditError> {
        self.stage(field, FieldInput::Date(date))
    }

    /// Stage a reference field by display label. Unknown labels are a user
    /// error; the binder lookup deliberately returns no id for them.
    pub fn choose(&mut self, field: &str, label: &str) -> Result<(), EditError> {
        let result = self.try_choose(field, label);
        self.surface_failure(&result);
        result
    }

    fn try_choose(&mut self, field: &str, label: &str) -> Result<(), EditError> {
        if self.binder.resolve_id_from_label(field, label).is_none() {
            return Err(EditError::UnknownChoice {
                field: field.to_string(),
                label: label.to_string(),
            });
        }
        self.binder.select_by_label(field, label);
        self.stage(field, FieldInput::Choice(Some(label.to_string())))
    }

    /// Reset one field to its empty representation.
    pub fn clear_field(&mut self, field: &str) -> Result<(), EditError> {
        let Some(spec) = self.schema.field(field) else {
            return Err(EditError::UnknownField(field.to_string()));
        };
        let kind = spec.kind;
        if kind == FieldKind::Reference {
            self.binder.clear_selection(field);
        }
        self.stage(field, FieldInput::empty_for(kind))
    }

    fn stage(&mut self, field: &str, input: FieldInput) -> Result<(), EditError> {
        if self.schema.field(field).is_none() {
            return Err(EditError::UnknownField(field.to_string()));
        }
        self.buffer.insert(field.to_string(), input);
        Ok(())
    }

    /// Reset every field to its empty representation: text to `""`, flags
    /// unchecked, references to no selection, dates to none.
    pub fn clear(&mut self) {
        for field in self.schema.fields() {
            self.buffer
                .insert(field.name.clone(), FieldInput::empty_for(field.kind));
            if field.kind == FieldKind::Reference {
                self.binder.clear_selection(&field.name);
            }
        }
    }

    /// The partial record staged in the buffer: non-blank fields only,
    /// reference labels resolved back to ids.
    pub fn staged_record(&self) -> Record {
        let mut record = Record::new();
        for field in self.schema.fields() {
            let Some(input) = self.buffer.get(&field.name) else {
                continue;
            };
            if input.is_blank() {
                continue;
            }
            let value = match input {
                FieldInput::Text(text) => Some(Value::Text(text.trim().to_string())),
                FieldInput::Flag(flag) => Some(Value::Flag(*flag)),
                FieldInput::Date(date) => date.map(Value::Date),
                FieldInput::Choice(Some(label)) => {
                    let resolved = self.binder.resolve_id_from_label(&field.name, label);
                    if resolved.is_none() {
                        debug!(field = %field.name, %label, "stale choice dropped");
                    }
                    resolved
                }
                FieldInput::Choice(None) => None,
            };
            if let Some(value) = value {
                record.set(&field.name, value);
            }
        }
        record
    }

    // ------------------------------------------------------------------
    // Display rows and selection
    // ------------------------------------------------------------------

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn columns(&self) -> Vec<String> {
        self.schema.field_names().map(str::to_string).collect()
    }

    /// Display projection of the fetched rows, in schema column order, with
    /// `Null` rendered as an empty string. The stored rows keep their nulls.
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                self.schema
                    .field_names()
                    .map(|name| row.value_or_null(name).display_string())
                    .collect()
            })
            .collect()
    }

    pub fn selected_row(&self) -> Option<&Record> {
        self.selected.and_then(|index| self.rows.get(index))
    }

    /// Copy a display row into the edit buffer. Reference columns are
    /// translated id→label through the binder; null values become the empty
    /// buffer representation. Selecting while mid-edit overwrites the
    /// buffer without a dirty check.
    pub fn select(&mut self, index: usize) -> Result<(), EditError> {
        let result = self.try_select(index);
        self.surface_failure(&result);
        result
    }

    fn try_select(&mut self, index: usize) -> Result<(), EditError> {
        if index >= self.rows.len() {
            return Err(EditError::NoSuchRow(index));
        }
        self.selected = Some(index);
        let row = self.rows[index].clone();
        for field in self.schema.fields().to_vec() {
            let value = row.value_or_null(&field.name);
            let input = match field.kind {
                FieldKind::Text => FieldInput::Text(value.display_string()),
                FieldKind::Flag => FieldInput::Flag(coerce_flag(&value)),
                FieldKind::Date => FieldInput::Date(coerce_date(&value)),
                FieldKind::Reference => {
                    if value.is_blank() {
                        self.binder.clear_selection(&field.name);
                        FieldInput::Choice(None)
                    } else if self.binder.has_slot(&field.name) {
                        self.binder.set_selection_by_id(&field.name, &value);
                        FieldInput::Choice(self.binder.selected_label(&field.name))
                    } else {
                        // No binding registered: fall back to the raw value,
                        // matching the display fallback of an unmapped combo.
                        FieldInput::Choice(Some(value.display_string()))
                    }
                }
            };
            self.buffer.insert(field.name.clone(), input);
        }
        Ok(())
    }

    /// Select the first row whose key columns match `condition`. Lets a
    /// shell address records by key instead of display position.
    pub fn select_by_key(&mut self, condition: &Record) -> Result<(), EditError> {
        let found = self.rows.iter().position(|row| {
            condition
                .iter()
                .all(|(name, value)| row.value_or_null(name).key_string() == value.key_string())
        });
        match found {
            Some(index) => self.select(index),
            None => {
                let error = EditError::NoSelection;
                self.surface(&error);
                Err(error)
            }
        }
    }

    // ------------------------------------------------------------------
    // CRUD cycle
    // ------------------------------------------------------------------

    /// Re-fetch every row for this entity and drop the selection.
    pub fn refresh(&mut self) -> Result<(), EditError> {
        let result = self.try_refresh();
        self.surface_failure(&result);
        result
    }

    fn try_refresh(&mut self) -> Result<(), EditError> {
        let rows = self.source.fetch_all(self.schema.name())?;
        self.rows = rows;
        self.selected = None;
        Ok(())
    }

    /// Insert the staged buffer as a new record.
    pub fn add(&mut self) -> Result<(), EditError> {
        let staged = self.staged_record();
        self.add_record(staged)
    }

    /// Insert a partial record: every schema field missing or blank becomes
    /// null, and blank key columns are generated as short ids. On success
    /// the buffer clears and the rows re-fetch; on failure all state stays
    /// put so the user can retry.
    pub fn add_record(&mut self, partial: Record) -> Result<(), EditError> {
        let result = self.try_add_record(partial);
        self.surface_failure(&result);
        result
    }

    fn try_add_record(&mut self, partial: Record) -> Result<(), EditError> {
        self.schema.validate_record(&partial)?;
        let mut full = Record::new();
        for field in self.schema.fields() {
            let value = partial.value_or_null(&field.name);
            let value = if value.is_blank() {
                if self.schema.is_key(&field.name) {
                    Value::Text(short_id())
                } else {
                    Value::Null
                }
            } else {
                value
            };
            full.set(&field.name, value);
        }
        self.source.insert(self.schema.name(), full)?;
        self.clear();
        self.try_refresh()
    }

    /// Patch the selected record with the non-blank buffer fields.
    ///
    /// Key columns never appear in the patch; they form the conjunctive
    /// condition, taken from the selected display row rather than the
    /// buffer so the key cannot be repointed mid-edit. An all-blank buffer
    /// is "nothing to update" and the data source is not called.
    pub fn update(&mut self) -> Result<(), EditError> {
        let result = self.try_update();
        self.surface_failure(&result);
        result
    }

    fn try_update(&mut self) -> Result<(), EditError> {
        let condition = self.selection_condition()?;
        let staged = self.staged_record();
        let mut patch = Record::new();
        for (name, value) in staged.iter() {
            if !self.schema.is_key(name) {
                patch.set(name, value.clone());
            }
        }
        if patch.is_empty() {
            return Err(EditError::NothingToUpdate);
        }
        self.source.update(self.schema.name(), &patch, &condition)?;
        self.clear();
        self.try_refresh()
    }

    /// Delete the selected record after interactive confirmation. A "no"
    /// answer is a silent no-op.
    pub fn delete(&mut self) -> Result<(), EditError> {
        let result = self.try_delete();
        self.surface_failure(&result);
        result
    }

    fn try_delete(&mut self) -> Result<(), EditError> {
        let condition = self.selection_condition()?;
        let confirmed = self.prompt.confirm(
            "Confirm Delete",
            "Are you sure you want to delete this record?",
        );
        if !confirmed {
            return Ok(());
        }
        self.source.delete(self.schema.name(), &condition)?;
        self.clear();
        self.try_refresh()
    }

    /// Conjunctive key condition from the selected display row. Every key
    /// column must carry a value.
    fn selection_condition(&self) -> Result<Record, EditError> {
        let row = self.selected_row().ok_or(EditError::NoSelection)?;
        let mut condition = Record::new();
        for column in self.schema.key_columns() {
            let value = row.value_or_null(column);
            if value.is_blank() {
                return Err(EditError::IncompleteKey);
            }
            condition.set(column, value);
        }
        Ok(condition)
    }

    // ------------------------------------------------------------------
    // Failure surfacing
    // ------------------------------------------------------------------

    fn surface_failure(&self, result: &Result<(), EditError>) {
        if let Err(error) = result {
            self.surface(error);
        }
    }

    fn surface(&self, error: &EditError) {
        if error.is_user_error() {
            self.messenger.report_warning("Warning", &error.to_string());
        } else {
            self.messenger
                .report_error("Database Error", &error.to_string());
        }
    }
}

fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Flag(flag) => *flag,
        Value::Number(number) => *number != 0.0,
        Value::Text(text) => text == "1" || text.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(date) => Some(*date),
        Value::Text(text) => NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}
