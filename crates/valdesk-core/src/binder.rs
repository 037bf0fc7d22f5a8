//! Two-way label/id binding for selectable fields.
//!
//! A reference field stores a foreign identifier but displays a
//! human-readable label. [`ChoiceBinder`] keeps the two in sync for any
//! number of independently named slots, each built from a snapshot of the
//! referenced entity's rows.

use std::collections::HashMap;

use tracing::debug;
use valdesk_model::{Record, Value};

#[derive(Debug, Clone)]
struct Selection {
    id: Value,
    label: String,
}

#[derive(Debug, Default, Clone)]
struct Slot {
    label_to_id: HashMap<String, Value>,
    id_to_label: HashMap<String, String>,
    labels: Vec<String>,
    selection: Option<Selection>,
}

impl Slot {
    /// Rebuild both maps from a row snapshot. Rows missing either key are
    /// skipped. Duplicate labels collapse, last write wins; the id→label
    /// map is then derived by inverting the collapsed label→id map, so the
    /// two maps stay mutual inverses and ids orphaned by the collapse
    /// resolve to the empty-label sentinel.
    fn rebuild(&mut self, rows: &[Record], id_key: &str, label_key: &str) {
        self.label_to_id.clear();
        self.labels.clear();
        for row in rows {
            let id = row.value_or_null(id_key);
            let label_value = row.value_or_null(label_key);
            if id.is_blank() || label_value.is_blank() {
                continue;
            }
            let label = label_value.display_string();
            if !self.label_to_id.contains_key(&label) {
                self.labels.push(label.clone());
            }
            self.label_to_id.insert(label, id);
        }
        self.id_to_label = self
            .label_to_id
            .iter()
            .map(|(label, id)| (id.key_string(), label.clone()))
            .collect();
    }

    fn label_for(&self, id: &Value) -> Option<&str> {
        self.id_to_label.get(&id.key_string()).map(String::as_str)
    }
}

/// Label↔id maps for one or more named binding slots.
#[derive(Debug, Default)]
pub struct ChoiceBinder {
    slots: HashMap<String, Slot>,
}

impl ChoiceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build (or overwrite) the binding for `slot` from a row snapshot.
    /// Any prior selection for the slot is discarded.
    pub fn bind(&mut self, slot: &str, rows: &[Record], id_key: &str, label_key: &str) {
        let mut built = Slot::default();
        built.rebuild(rows, id_key, label_key);
        self.slots.insert(slot.to_string(), built);
    }

    /// Rebuild an existing slot from fresh rows and return the new label
    /// set so a display list can be repopulated. Selection by id survives
    /// when the id is still present; otherwise the selection clears.
    ///
    /// A never-bound slot is a lookup miss, not an error: logged and `None`.
    pub fn refresh(
        &mut self,
        slot: &str,
        rows: &[Record],
        id_key: &str,
        label_key: &str,
    ) -> Option<Vec<String>> {
        let Some(existing) = self.slots.get_mut(slot) else {
            debug!(slot, "refresh on unbound slot ignored");
            return None;
        };
        let kept_id = existing.selection.take().map(|selection| selection.id);
        existing.rebuild(rows, id_key, label_key);
        if let Some(id) = kept_id {
            existing.selection = existing.label_for(&id).map(|label| Selection {
                label: label.to_string(),
                id,
            });
        }
        Some(existing.labels.clone())
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// The current label set of a slot, in first-bound order.
    pub fn labels(&self, slot: &str) -> Option<&[String]> {
        self.slots.get(slot).map(|s| s.labels.as_slice())
    }

    /// Label → id. `None` when the label (or slot) is unknown; the caller
    /// decides whether that is a validation failure.
    pub fn resolve_id_from_label(&self, slot: &str, label: &str) -> Option<Value> {
        self.slots
            .get(slot)?
            .label_to_id
            .get(label)
            .cloned()
    }

    /// Id → label. Empty-string sentinel when the id has no known label,
    /// e.g. a stale selection after a refresh dropped its row.
    pub fn resolve_label_from_id(&self, slot: &str, id: &Value) -> String {
        self.slots
            .get(slot)
            .and_then(|s| s.label_for(id))
            .unwrap_or_default()
            .to_string()
    }

    /// Make the slot's visible selection the label of `id`, or clear it
    /// when the id is unknown.
    pub fn set_selection_by_id(&mut self, slot: &str, id: &Value) {
        if let Some(existing) = self.slots.get_mut(slot) {
            existing.selection = existing.label_for(id).map(|label| Selection {
                label: label.to_string(),
                id: id.clone(),
            });
        }
    }

    /// Select by display label (the combobox-selected direction). Unknown
    /// labels clear the selection.
    pub fn select_by_label(&mut self, slot: &str, label: &str) {
        if let Some(existing) = self.slots.get_mut(slot) {
            existing.selection = existing.label_to_id.get(label).map(|id| Selection {
                id: id.clone(),
                label: label.to_string(),
            });
        }
    }

    pub fn clear_selection(&mut self, slot: &str) {
        if let Some(existing) = self.slots.get_mut(slot) {
            existing.selection = None;
        }
    }

    pub fn selected_id(&self, slot: &str) -> Option<Value> {
        self.slots
            .get(slot)?
            .selection
            .as_ref()
            .map(|selection| selection.id.clone())
    }

    pub fn selected_label(&self, slot: &str) -> Option<String> {
        self.slots
            .get(slot)?
            .selection
            .as_ref()
            .map(|selection| selection.label.clone())
    }
}
