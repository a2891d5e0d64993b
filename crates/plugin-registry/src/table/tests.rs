//! Unit tests for the creator table.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::test_support::StubCreator;

fn record(name: &str, version: &str, namespace: &str) -> CreatorRecord {
    CreatorRecord::new(
        CreatorIdentity::new(name, version, namespace),
        StubCreator::shared(name, version),
        None,
    )
}

#[fixture]
fn populated_table() -> CreatorTable {
    let mut table = CreatorTable::new();
    table.insert(record("Relu", "1", "")).expect("insert relu");
    table.insert(record("Gelu", "2", "act")).expect("insert gelu");
    table.insert(record("Relu", "2", "")).expect("insert relu v2");
    table
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn new_table_is_empty() {
    let table = CreatorTable::new();
    assert!(table.is_empty());
    assert_eq!(table.len(), 0);
    assert!(table.records().is_empty());
}

// ---------------------------------------------------------------------------
// Insertion
// ---------------------------------------------------------------------------

#[test]
fn insert_rejects_duplicate_without_overwriting() {
    let mut table = CreatorTable::new();
    let original = record("Foo", "1", "ns");
    let original_creator = original.creator().clone();
    table.insert(original).expect("first insert");

    let error = table
        .insert(record("Foo", "1", "ns"))
        .expect_err("duplicate should fail");
    assert!(matches!(error, RegistryError::Conflict { .. }));

    let held = table
        .get(&CreatorIdentity::new("Foo", "1", "ns"))
        .expect("original still present");
    assert!(Arc::ptr_eq(held.creator(), &original_creator));
    assert_eq!(table.len(), 1);
}

#[rstest]
fn versions_and_namespaces_are_independent_keys(populated_table: CreatorTable) {
    assert_eq!(populated_table.len(), 3);
    assert!(populated_table.find("Relu", "1", "").is_some());
    assert!(populated_table.find("Relu", "2", "").is_some());
    assert!(populated_table.find("Gelu", "2", "").is_none());
}

#[rstest]
#[case("Relu", "1", "", true)]
#[case("Gelu", "2", "act", true)]
#[case("Gelu", "2", "ac", false)]
#[case("Relu", "", "1", false)]
fn find_agrees_with_identity_lookup(
    populated_table: CreatorTable,
    #[case] name: &str,
    #[case] version: &str,
    #[case] namespace: &str,
    #[case] present: bool,
) {
    let by_fields = populated_table.find(name, version, namespace);
    let by_identity = populated_table.get(&CreatorIdentity::new(name, version, namespace));
    assert_eq!(by_fields.is_some(), present);
    assert_eq!(
        by_fields.map(CreatorRecord::identity),
        by_identity.map(CreatorRecord::identity)
    );
}

// ---------------------------------------------------------------------------
// Lookup and enumeration
// ---------------------------------------------------------------------------

#[rstest]
fn records_preserve_registration_order(populated_table: CreatorTable) {
    let names: Vec<String> = populated_table
        .records()
        .iter()
        .map(|r| r.identity().to_string())
        .collect();
    assert_eq!(names, vec!["Relu/1", "Gelu/2@act", "Relu/2"]);
}

#[rstest]
fn find_instance_locates_exact_object(populated_table: CreatorTable) {
    let gelu = populated_table
        .find("Gelu", "2", "act")
        .expect("gelu present")
        .creator()
        .clone();
    let located = populated_table
        .find_instance(gelu.as_ref())
        .expect("instance lookup");
    assert_eq!(located.identity().name(), "Gelu");

    let stranger = StubCreator::shared("Gelu", "2");
    assert!(populated_table.find_instance(stranger.as_ref()).is_none());
}

// ---------------------------------------------------------------------------
// Removal
// ---------------------------------------------------------------------------

#[rstest]
fn remove_then_reinsert(mut populated_table: CreatorTable) {
    let identity = CreatorIdentity::new("Relu", "1", "");
    assert!(populated_table.remove(&identity).is_some());
    assert!(populated_table.get(&identity).is_none());
    assert!(populated_table.remove(&identity).is_none());
    populated_table
        .insert(record("Relu", "1", ""))
        .expect("reinsert after removal");
    let last = populated_table.records().pop().expect("non-empty");
    assert_eq!(last.identity(), &identity);
}

#[rstest]
fn drain_empties_table_in_order(mut populated_table: CreatorTable) {
    let drained = populated_table.drain();
    assert_eq!(drained.len(), 3);
    assert_eq!(
        drained.first().map(|r| r.identity().name()),
        Some("Relu")
    );
    assert!(populated_table.is_empty());
}
