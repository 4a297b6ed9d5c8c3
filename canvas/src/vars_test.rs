use super::*;

#[test]
fn new_store_is_empty() {
    let store = VariableStore::new();
    assert!(store.is_empty());
    assert!(store.snapshot().is_empty());
}

#[test]
fn assignment_is_recorded() {
    let mut store = VariableStore::new();
    assert!(store.apply(&EvaluationResult::new("x", "5", true)));
    let snap = store.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap.get("x").map(String::as_str), Some("5"));
}

#[test]
fn non_assignment_never_mutates() {
    let mut store = VariableStore::new();
    store.apply(&EvaluationResult::new("y", "2", true));
    let before = store.snapshot();
    assert!(!store.apply(&EvaluationResult::new("2+2", "4", false)));
    assert!(!store.apply(&EvaluationResult::new("y", "99", false)));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn reassignment_overwrites_prior_value() {
    let mut store = VariableStore::new();
    store.apply(&EvaluationResult::new("x", "5", true));
    store.apply(&EvaluationResult::new("x", "7", true));
    assert_eq!(store.get("x"), Some("7"));
    assert_eq!(store.len(), 1);
}

#[test]
fn reassigning_same_value_reports_unchanged() {
    let mut store = VariableStore::new();
    store.apply(&EvaluationResult::new("x", "5", true));
    assert!(!store.apply(&EvaluationResult::new("x", "5", true)));
}

#[test]
fn results_apply_in_order() {
    let mut store = VariableStore::new();
    let batch = [
        EvaluationResult::new("a", "1", true),
        EvaluationResult::new("a", "2", true),
        EvaluationResult::new("b", "3", true),
    ];
    for r in &batch {
        store.apply(r);
    }
    assert_eq!(store.get("a"), Some("2"));
    assert_eq!(store.get("b"), Some("3"));
}

#[test]
fn snapshot_is_detached_from_store() {
    let mut store = VariableStore::new();
    store.apply(&EvaluationResult::new("x", "5", true));
    let snap = store.snapshot();
    store.apply(&EvaluationResult::new("x", "6", true));
    assert_eq!(snap.get("x").map(String::as_str), Some("5"));
}

#[test]
fn reset_clears_bindings() {
    let mut store = VariableStore::new();
    store.apply(&EvaluationResult::new("x", "5", true));
    store.reset();
    assert!(store.is_empty());
    assert_eq!(store.get("x"), None);
}

#[test]
fn result_uses_wire_field_names() {
    let parsed: EvaluationResult =
        serde_json::from_value(serde_json::json!({ "expr": "x", "result": "5", "assign": true })).unwrap();
    assert_eq!(parsed, EvaluationResult::new("x", "5", true));
}
