//! Table-driven entity definitions for the value-measurement schema.
//!
//! One catalog entry per entity replaces per-screen field lists: editors,
//! the store, and the CLI all read the same definitions.

use valdesk_model::{EntitySchema, FieldSpec, ModelError, Record};

/// The eight entities of the value-measurement schema, in tab order.
pub fn default_catalog() -> Result<Vec<EntitySchema>, ModelError> {
    Ok(vec![
        initiative()?,
        event()?,
        metric()?,
        plan()?,
        event_plan()?,
        global_metric_value()?,
        plan_metric_value()?,
        user_query()?,
    ])
}

fn initiative() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "initiative",
        vec![
            FieldSpec::text("initiative_id"),
            FieldSpec::text("initiative_title"),
            FieldSpec::text("initiative_description"),
            FieldSpec::text("initiative_owner"),
            FieldSpec::date("planned_start_date"),
            FieldSpec::date("planned_end_date"),
            FieldSpec::date("actual_start_date"),
            FieldSpec::date("actual_end_date"),
        ],
    )
}

fn event() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "event",
        vec![
            FieldSpec::text("event_id"),
            FieldSpec::reference("initiative_id", "initiative", "initiative_id", "initiative_title"),
            FieldSpec::text("event_title"),
            FieldSpec::text("event_description"),
            FieldSpec::date("event_date"),
            FieldSpec::text("activation_id"),
        ],
    )
}

fn metric() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "metric",
        vec![
            FieldSpec::text("metric_id"),
            FieldSpec::reference("initiative_id", "initiative", "initiative_id", "initiative_title"),
            FieldSpec::text("metric_name"),
            FieldSpec::text("metric_definition"),
            FieldSpec::flag("is_plan_level"),
            FieldSpec::text("collection_frequency"),
        ],
    )
}

fn plan() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "plan",
        vec![FieldSpec::text("plan_id"), FieldSpec::text("plan_name")],
    )
}

/// Junction between events and plans; the only composite-key entity.
fn event_plan() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "event_plan",
        vec![
            FieldSpec::reference("event_id", "event", "event_id", "event_title"),
            FieldSpec::reference("plan_id", "plan", "plan_id", "plan_name"),
        ],
    )?
    .with_key(&["event_id", "plan_id"])
}

fn global_metric_value() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "global_metric_value",
        vec![
            FieldSpec::text("global_value_id"),
            FieldSpec::reference("metric_id", "metric", "metric_id", "metric_name"),
            FieldSpec::date("metric_date"),
            FieldSpec::text("actual_value"),
        ],
    )
}

fn plan_metric_value() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "plan_metric_value",
        vec![
            FieldSpec::text("plan_value_id"),
            FieldSpec::reference("metric_id", "metric", "metric_id", "metric_name"),
            FieldSpec::reference("plan_id", "plan", "plan_id", "plan_name"),
            FieldSpec::date("metric_date"),
            FieldSpec::text("actual_value"),
        ],
    )
}

fn user_query() -> Result<EntitySchema, ModelError> {
    EntitySchema::new(
        "user_query",
        vec![
            FieldSpec::text("query_id"),
            FieldSpec::text("query_title"),
            FieldSpec::text("query_description"),
            FieldSpec::text("query_purpose"),
            FieldSpec::text("query_string"),
            FieldSpec::flag("set_operation"),
            FieldSpec::flag("set_membership"),
            FieldSpec::flag("set_comparison"),
            FieldSpec::flag("subquery"),
            FieldSpec::flag("cte"),
            FieldSpec::flag("aggregate_function"),
            FieldSpec::flag("window_function"),
            FieldSpec::flag("olap"),
        ],
    )
}

/// Starter rows for `user_query`, seeded by `init` on an empty store.
pub fn starter_queries() -> Vec<Record> {
    vec![
        Record::new()
            .with("query_title", "All Initiatives")
            .with("query_description", "Every initiative on record")
            .with("query_string", "SELECT * FROM initiative ORDER BY initiative_title"),
        Record::new()
            .with("query_title", "All Metrics")
            .with("query_description", "Every metric with its owning initiative id")
            .with("query_string", "SELECT * FROM metric ORDER BY metric_name"),
        Record::new()
            .with("query_title", "Event Plan Links")
            .with("query_description", "Junction rows linking events to plans")
            .with("query_string", "SELECT event_id, plan_id FROM event_plan"),
    ]
}
