//! Variable bindings accumulated from assignment results.
//!
//! Bindings are sent back to the evaluation service with every request so a
//! later drawing can refer to a name assigned by an earlier one.

#[cfg(test)]
#[path = "vars_test.rs"]
mod vars_test;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entry of an evaluation response, in the order received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// The recognized expression (or variable name, for assignments).
    #[serde(rename = "expr")]
    pub expression: String,
    /// The computed value.
    pub result: String,
    /// Whether this entry binds `expression` to `result`.
    #[serde(rename = "assign")]
    pub is_assignment: bool,
}

impl EvaluationResult {
    #[must_use]
    pub fn new(expression: impl Into<String>, result: impl Into<String>, is_assignment: bool) -> Self {
        Self { expression: expression.into(), result: result.into(), is_assignment }
    }
}

/// Name → most recently assigned value. Ordered so requests serialize deterministically.
pub type Bindings = BTreeMap<String, String>;

/// Symbol table fed by assignment results.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    bindings: Bindings,
}

impl VariableStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result` if it is an assignment. Returns `true` when the store changed.
    pub fn apply(&mut self, result: &EvaluationResult) -> bool {
        if !result.is_assignment {
            return false;
        }
        let previous = self.bindings.insert(result.expression.clone(), result.result.clone());
        previous.as_deref() != Some(result.result.as_str())
    }

    /// Copy of the current bindings for the next request.
    #[must_use]
    pub fn snapshot(&self) -> Bindings {
        self.bindings.clone()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    pub fn reset(&mut self) {
        self.bindings.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
