pub mod error;
pub mod field;
pub mod ids;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{ModelError, Result};
pub use field::{FieldKind, FieldSpec, ReferenceSource};
pub use ids::{SHORT_ID_LEN, short_id};
pub use record::Record;
pub use schema::EntitySchema;
pub use value::Value;

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_schema() -> EntitySchema {
        EntitySchema::new(
            "plan",
            vec![FieldSpec::text("plan_id"), FieldSpec::text("plan_name")],
        )
        .expect("schema")
    }

    #[test]
    fn default_key_is_first_field() {
        let schema = plan_schema();
        assert_eq!(schema.key_columns(), ["plan_id"]);
        assert!(schema.is_key("plan_id"));
        assert!(!schema.is_key("plan_name"));
    }

    #[test]
    fn composite_key_spans_all_declared_columns() {
        let schema = EntitySchema::new(
            "event_plan",
            vec![
                FieldSpec::reference("event_id", "event", "event_id", "event_title"),
                FieldSpec::reference("plan_id", "plan", "plan_id", "plan_name"),
            ],
        )
        .expect("schema")
        .with_key(&["event_id", "plan_id"])
        .expect("key");
        assert!(schema.has_composite_key());
        assert_eq!(schema.key_columns(), ["event_id", "plan_id"]);
    }

    #[test]
    fn key_column_must_exist() {
        let result = plan_schema().with_key(&["plan_code"]);
        assert!(matches!(
            result,
            Err(ModelError::InvalidKeyColumn { .. })
        ));
    }

    #[test]
    fn record_with_unknown_field_is_rejected() {
        let schema = plan_schema();
        let record = Record::new().with("plan_id", "ab12cd34").with("owner", "x");
        assert!(matches!(
            schema.validate_record(&record),
            Err(ModelError::UnknownField { .. })
        ));
    }

    #[test]
    fn value_serde_round_trip() {
        let record = Record::new()
            .with("plan_id", "ab12cd34")
            .with("plan_name", Value::Null);
        let json = serde_json::to_string(&record).expect("serialize");
        let back: Record = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, record);
        assert_eq!(back.value_or_null("plan_name"), Value::Null);
    }
}
