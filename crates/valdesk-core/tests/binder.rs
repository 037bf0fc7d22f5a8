//! Choice binder behavior: bind/refresh, two-way resolution, selection
//! survival, and label-collision policy.

use proptest::prelude::*;
use valdesk_core::ChoiceBinder;
use valdesk_model::{Record, Value};

fn initiative_rows() -> Vec<Record> {
    vec![
        Record::new().with("id", 1.0).with("name", "A"),
        Record::new().with("id", 2.0).with("name", "B"),
    ]
}

#[test]
fn resolves_both_directions_after_bind() {
    let mut binder = ChoiceBinder::new();
    binder.bind("initiative", &initiative_rows(), "id", "name");

    assert_eq!(
        binder.resolve_label_from_id("initiative", &Value::Number(2.0)),
        "B"
    );
    assert_eq!(
        binder.resolve_id_from_label("initiative", "A"),
        Some(Value::Number(1.0))
    );
    assert_eq!(binder.resolve_id_from_label("initiative", "C"), None);
}

#[test]
fn refresh_drops_stale_ids_and_renames_survivors() {
    let mut binder = ChoiceBinder::new();
    binder.bind("initiative", &initiative_rows(), "id", "name");

    let new_rows = vec![Record::new().with("id", 2.0).with("name", "B2")];
    let labels = binder
        .refresh("initiative", &new_rows, "id", "name")
        .expect("slot is bound");
    assert_eq!(labels, ["B2"]);

    assert_eq!(
        binder.resolve_label_from_id("initiative", &Value::Number(1.0)),
        ""
    );
    assert_eq!(
        binder.resolve_label_from_id("initiative", &Value::Number(2.0)),
        "B2"
    );
}

#[test]
fn refresh_of_unbound_slot_is_a_lookup_miss() {
    let mut binder = ChoiceBinder::new();
    assert_eq!(binder.refresh("nowhere", &initiative_rows(), "id", "name"), None);
}

#[test]
fn rows_missing_either_key_are_skipped() {
    let rows = vec![
        Record::new().with("id", "a1").with("name", "Alpha"),
        Record::new().with("id", "b2"),
        Record::new().with("name", "Gamma"),
        Record::new().with("id", "d4").with("name", Value::Null),
    ];
    let mut binder = ChoiceBinder::new();
    binder.bind("slot", &rows, "id", "name");
    assert_eq!(binder.labels("slot").expect("bound"), ["Alpha"]);
}

#[test]
fn duplicate_labels_collapse_last_write_wins() {
    let rows = vec![
        Record::new().with("id", "first").with("name", "Same"),
        Record::new().with("id", "last").with("name", "Same"),
    ];
    let mut binder = ChoiceBinder::new();
    binder.bind("slot", &rows, "id", "name");

    assert_eq!(
        binder.resolve_id_from_label("slot", "Same"),
        Some(Value::Text("last".to_string()))
    );
    // The collapsed-away id resolves to the empty-label sentinel, keeping
    // the two maps mutual inverses.
    assert_eq!(
        binder.resolve_label_from_id("slot", &Value::Text("first".to_string())),
        ""
    );
    assert_eq!(
        binder.resolve_label_from_id("slot", &Value::Text("last".to_string())),
        "Same"
    );
}

#[test]
fn selection_by_id_shows_label_or_clears() {
    let mut binder = ChoiceBinder::new();
    binder.bind("initiative", &initiative_rows(), "id", "name");

    binder.set_selection_by_id("initiative", &Value::Number(1.0));
    assert_eq!(binder.selected_label("initiative").as_deref(), Some("A"));
    assert_eq!(binder.selected_id("initiative"), Some(Value::Number(1.0)));

    binder.set_selection_by_id("initiative", &Value::Number(9.0));
    assert_eq!(binder.selected_label("initiative"), None);
    assert_eq!(binder.selected_id("initiative"), None);
}

#[test]
fn selection_survives_refresh_when_id_persists() {
    let mut binder = ChoiceBinder::new();
    binder.bind("initiative", &initiative_rows(), "id", "name");
    binder.set_selection_by_id("initiative", &Value::Number(2.0));

    let renamed = vec![Record::new().with("id", 2.0).with("name", "B2")];
    binder.refresh("initiative", &renamed, "id", "name");
    assert_eq!(binder.selected_label("initiative").as_deref(), Some("B2"));

    let dropped = vec![Record::new().with("id", 3.0).with("name", "C")];
    binder.refresh("initiative", &dropped, "id", "name");
    assert_eq!(binder.selected_label("initiative"), None);
}

#[test]
fn rebind_overwrites_slot_and_discards_selection() {
    let mut binder = ChoiceBinder::new();
    binder.bind("initiative", &initiative_rows(), "id", "name");
    binder.select_by_label("initiative", "A");
    assert!(binder.selected_id("initiative").is_some());

    binder.bind(
        "initiative",
        &[Record::new().with("id", 7.0).with("name", "Z")],
        "id",
        "name",
    );
    assert_eq!(binder.labels("initiative").expect("bound"), ["Z"]);
    assert_eq!(binder.selected_id("initiative"), None);
}

proptest! {
    /// For every currently-bound id with a unique label, label and id
    /// round-trip through the two maps.
    #[test]
    fn unique_labels_round_trip(ids in proptest::collection::hash_set("[a-f0-9]{8}", 1..20)) {
        let rows: Vec<Record> = ids
            .iter()
            .map(|id| {
                Record::new()
                    .with("id", id.as_str())
                    .with("name", format!("label-{id}"))
            })
            .collect();
        let mut binder = ChoiceBinder::new();
        binder.bind("slot", &rows, "id", "name");
        for id in &ids {
            let value = Value::Text(id.clone());
            let label = binder.resolve_label_from_id("slot", &value);
            prop_assert!(!label.is_empty());
            prop_assert_eq!(binder.resolve_id_from_label("slot", &label), Some(value));
        }
    }
}
