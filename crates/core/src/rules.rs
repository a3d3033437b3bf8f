//! Routing rule data model.
//!
//! A [`Rule`] maps a conjunction of [`Condition`]s over an intake request to
//! the [`Assignee`] who should handle it. The JSON wire format uses camelCase
//! names (`requestType`, `oneOf`, `createdAt`) and an untagged
//! [`ConditionValue`] that is either a string or a list of strings.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::{RuleId, Timestamp};

// ---------------------------------------------------------------------------
// Condition
// ---------------------------------------------------------------------------

/// The attribute of an intake request a condition tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionField {
    RequestType,
    Department,
    Location,
    Seniority,
    Keywords,
}

impl ConditionField {
    pub const ALL: [ConditionField; 5] = [
        ConditionField::RequestType,
        ConditionField::Department,
        ConditionField::Location,
        ConditionField::Seniority,
        ConditionField::Keywords,
    ];

    /// Wire name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionField::RequestType => "requestType",
            ConditionField::Department => "department",
            ConditionField::Location => "location",
            ConditionField::Seniority => "seniority",
            ConditionField::Keywords => "keywords",
        }
    }

    /// Parse a wire name. Unknown names return `None`.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison applied between the request field and the condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConditionOperator {
    Equals,
    OneOf,
    Includes,
}

impl ConditionOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionOperator::Equals => "equals",
            ConditionOperator::OneOf => "oneOf",
            ConditionOperator::Includes => "includes",
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Single(String),
    Many(Vec<String>),
}

impl ConditionValue {
    /// Drop blank entries. Returns `None` when nothing meaningful is left.
    pub fn pruned(self) -> Option<Self> {
        match self {
            ConditionValue::Single(s) if s.trim().is_empty() => None,
            ConditionValue::Single(s) => Some(ConditionValue::Single(s)),
            ConditionValue::Many(values) => {
                let kept: Vec<String> = values
                    .into_iter()
                    .filter(|v| !v.trim().is_empty())
                    .collect();
                if kept.is_empty() {
                    None
                } else {
                    Some(ConditionValue::Many(kept))
                }
            }
        }
    }

    /// All entries, in order. A single value yields one entry.
    pub fn entries(&self) -> &[String] {
        match self {
            ConditionValue::Single(s) => std::slice::from_ref(s),
            ConditionValue::Many(values) => values,
        }
    }
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Single(s) => f.write_str(s),
            ConditionValue::Many(values) => f.write_str(&values.join(", ")),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Single(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Single(value)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        ConditionValue::Many(values)
    }
}

impl From<Vec<&str>> for ConditionValue {
    fn from(values: Vec<&str>) -> Self {
        ConditionValue::Many(values.into_iter().map(str::to_string).collect())
    }
}

/// One `field operator value` predicate within a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl Condition {
    pub fn new(
        field: ConditionField,
        operator: ConditionOperator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            field,
            operator,
            value: value.into(),
        }
    }
}

/// Renders as `field operator value`, e.g. `keywords includes urgent, renewal`.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, self.value)
    }
}

/// Remove conditions whose value is blank, keeping order.
pub fn prune_conditions(conditions: Vec<Condition>) -> Vec<Condition> {
    conditions
        .into_iter()
        .filter_map(|c| {
            let value = c.value.pruned()?;
            Some(Condition { value, ..c })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// The person a matching request is routed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    pub name: String,
    pub email: String,
}

/// A stored routing rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    pub active: bool,
    pub conditions: Vec<Condition>,
    pub assignee: Assignee,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Rule {
    /// Build a rule from caller input plus store-assigned id and timestamp.
    pub fn from_input(id: RuleId, input: RuleInput, now: Timestamp) -> Self {
        Self {
            id,
            name: input.name,
            active: input.active,
            conditions: input.conditions,
            assignee: input.assignee,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Shallow-merge a patch. Identity and timestamps are never touched here.
    pub fn apply_patch(&mut self, patch: RulePatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        if let Some(conditions) = patch.conditions {
            self.conditions = conditions;
        }
        if let Some(assignee) = patch.assignee {
            self.assignee = assignee;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }
}

/// Caller-supplied fields for a new rule. Any `id`/`createdAt`/`updatedAt`
/// present in the JSON body is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleInput {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
    pub conditions: Vec<Condition>,
    pub assignee: Assignee,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RuleInput {
    /// Strip blank-valued conditions.
    pub fn pruned(mut self) -> Self {
        self.conditions = prune_conditions(self.conditions);
        self
    }
}

/// Partial update. Absent fields keep their stored value; `"notes": null`
/// clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RulePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub conditions: Option<Vec<Condition>>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default, deserialize_with = "present_or_null")]
    pub notes: Option<Option<String>>,
}

impl RulePatch {
    pub fn pruned(mut self) -> Self {
        self.conditions = self.conditions.map(prune_conditions);
        self
    }
}

fn default_active() -> bool {
    true
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
