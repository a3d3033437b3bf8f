//! Rule matcher: pure logic, no storage access.
//!
//! Picks the first active rule, in store order, whose conditions all hold for
//! a normalized request. Rule order is the only priority; there is no
//! specificity scoring.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::rules::{Condition, ConditionField, ConditionOperator, ConditionValue, Rule};

/// Field values resolved from a user's free-text request.
///
/// Deserializes from any JSON object keyed by field name. Unknown keys are
/// ignored, lists of strings are joined with spaces, and values of any other
/// shape (null, numbers, objects) are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, Value>")]
pub struct NormalizedRequest {
    fields: BTreeMap<ConditionField, String>,
}

impl NormalizedRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, field: ConditionField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: ConditionField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

impl From<BTreeMap<String, Value>> for NormalizedRequest {
    fn from(raw: BTreeMap<String, Value>) -> Self {
        let fields = raw
            .into_iter()
            .filter_map(|(key, value)| {
                let field = ConditionField::parse(&key)?;
                Some((field, field_text(value)?))
            })
            .collect();
        Self { fields }
    }
}

fn field_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Array(items) => {
            let parts: Vec<String> = items
                .into_iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(" "))
        }
        _ => None,
    }
}

/// Return the first active rule whose conditions all match `request`.
pub fn match_rule<'a>(request: &NormalizedRequest, rules: &'a [Rule]) -> Option<&'a Rule> {
    rules
        .iter()
        .filter(|rule| rule.active)
        .find(|rule| rule_matches(rule, request))
}

/// A rule with no conditions never matches.
pub fn rule_matches(rule: &Rule, request: &NormalizedRequest) -> bool {
    !rule.conditions.is_empty()
        && rule
            .conditions
            .iter()
            .all(|condition| condition_matches(condition, request))
}

/// Evaluate one condition. A missing or blank request field is a non-match.
pub fn condition_matches(condition: &Condition, request: &NormalizedRequest) -> bool {
    let actual = match request.get(condition.field).map(normalize) {
        Some(v) if !v.is_empty() => v,
        _ => return false,
    };

    match condition.operator {
        ConditionOperator::Equals => match &condition.value {
            ConditionValue::Single(expected) => normalize(expected) == actual,
            // A list under `equals` is a misconfigured rule.
            ConditionValue::Many(_) => false,
        },
        ConditionOperator::OneOf => condition
            .value
            .entries()
            .iter()
            .any(|candidate| normalize(candidate) == actual),
        ConditionOperator::Includes => condition
            .value
            .entries()
            .iter()
            .map(|needle| normalize(needle))
            .filter(|needle| !needle.is_empty())
            .any(|needle| actual.contains(&needle)),
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
