#![deny(unsafe_code)]

/// The closed set of editable field kinds.
///
/// Widget-specific dispatch in a shell maps onto these variants; the core
/// never sees a concrete widget type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Reference,
    Flag,
    Date,
}

/// Where a reference field's label set comes from: another entity's rows,
/// keyed by `id_column` and displayed by `label_column`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReferenceSource {
    pub entity: String,
    pub id_column: String,
    pub label_column: String,
}

/// One editable attribute of an entity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub reference: Option<ReferenceSource>,
}

impl FieldSpec {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            reference: None,
        }
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Flag,
            reference: None,
        }
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Date,
            reference: None,
        }
    }

    pub fn reference(
        name: impl Into<String>,
        entity: impl Into<String>,
        id_column: impl Into<String>,
        label_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Reference,
            reference: Some(ReferenceSource {
                entity: entity.into(),
                id_column: id_column.into(),
                label_column: label_column.into(),
            }),
        }
    }
}
