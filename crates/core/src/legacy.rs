//! Import of rules exported by the earlier JSON-file backend.
//!
//! That backend wrote a bare JSON array of rules. Its condition objects used
//! `op` where the current schema uses `operator`, and hand-edited records may
//! lack `id` or timestamps. This module is the only place `op` is accepted.

use std::collections::HashSet;

use serde::Deserialize;

use crate::rules::{
    prune_conditions, Assignee, Condition, ConditionField, ConditionOperator, ConditionValue, Rule,
};
use crate::types::{new_rule_id, Timestamp};

#[derive(Debug, thiserror::Error)]
pub enum LegacyImportError {
    #[error("Rules file is not a valid rule array: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule '{rule}' has a {field} condition without an operator")]
    MissingOperator { rule: String, field: ConditionField },

    #[error("Rule id '{0}' appears more than once")]
    DuplicateId(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyRule {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default = "default_active")]
    active: bool,
    #[serde(default)]
    conditions: Vec<LegacyCondition>,
    assignee: Assignee,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_at: Option<Timestamp>,
    #[serde(default)]
    updated_at: Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
struct LegacyCondition {
    field: ConditionField,
    #[serde(default)]
    operator: Option<ConditionOperator>,
    #[serde(default)]
    op: Option<ConditionOperator>,
    value: ConditionValue,
}

fn default_active() -> bool {
    true
}

/// Parse a legacy rules file into canonical rules, preserving file order.
///
/// Missing ids are minted, a missing `createdAt` becomes `now`, and a missing
/// `updatedAt` falls back to the creation time.
pub fn parse_legacy_rules(json: &str, now: Timestamp) -> Result<Vec<Rule>, LegacyImportError> {
    let raw: Vec<LegacyRule> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    let mut rules = Vec::with_capacity(raw.len());

    for legacy in raw {
        let mut conditions = Vec::with_capacity(legacy.conditions.len());
        for cond in legacy.conditions {
            let operator = cond.operator.or(cond.op).ok_or_else(|| {
                LegacyImportError::MissingOperator {
                    rule: legacy.name.clone(),
                    field: cond.field,
                }
            })?;
            conditions.push(Condition::new(cond.field, operator, cond.value));
        }

        let id = legacy.id.unwrap_or_else(new_rule_id);
        if !seen.insert(id.clone()) {
            return Err(LegacyImportError::DuplicateId(id));
        }

        let created_at = legacy.created_at.unwrap_or(now);
        rules.push(Rule {
            id,
            name: legacy.name,
            active: legacy.active,
            conditions: prune_conditions(conditions),
            assignee: legacy.assignee,
            notes: legacy.notes,
            created_at,
            updated_at: legacy.updated_at.unwrap_or(created_at),
        });
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    #[test]
    fn accepts_legacy_op_spelling() {
        let json = r#"[
            {
                "id": "a1",
                "name": "Sales AU",
                "active": true,
                "conditions": [
                    {"field": "location", "op": "equals", "value": "Australia"},
                    {"field": "keywords", "operator": "includes", "value": ["urgent", ""]}
                ],
                "assignee": {"name": "Jane", "email": "jane@acme.corp"},
                "createdAt": "2024-01-01T00:00:00Z",
                "updatedAt": "2024-02-01T00:00:00Z"
            }
        ]"#;

        let rules = parse_legacy_rules(json, Utc::now()).unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.id, "a1");
        assert_eq!(rule.conditions[0].operator, ConditionOperator::Equals);
        assert_eq!(rule.conditions[1].value, ConditionValue::Many(vec!["urgent".into()]));
        assert_eq!(rule.created_at, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(rule.updated_at, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn fills_missing_identity_and_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let json = r#"[
            {"name": "A", "conditions": [], "assignee": {"name": "a", "email": "a@acme.corp"}},
            {"name": "B", "conditions": [], "assignee": {"name": "b", "email": "b@acme.corp"}}
        ]"#;

        let rules = parse_legacy_rules(json, now).unwrap();

        assert_eq!(rules.len(), 2);
        assert_ne!(rules[0].id, rules[1].id);
        assert!(!rules[0].id.is_empty());
        assert_eq!(rules[0].created_at, now);
        assert_eq!(rules[0].updated_at, now);
        assert!(rules[0].active);
        assert_eq!(rules[1].name, "B");
    }

    #[test]
    fn condition_without_operator_is_rejected() {
        let json = r#"[{
            "name": "Broken",
            "conditions": [{"field": "location", "value": "Australia"}],
            "assignee": {"name": "a", "email": "a@acme.corp"}
        }]"#;
        assert_matches!(
            parse_legacy_rules(json, Utc::now()),
            Err(LegacyImportError::MissingOperator { field: ConditionField::Location, .. })
        );
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let json = r#"[
            {"id": "x", "name": "A", "conditions": [], "assignee": {"name": "a", "email": "a@acme.corp"}},
            {"id": "x", "name": "B", "conditions": [], "assignee": {"name": "b", "email": "b@acme.corp"}}
        ]"#;
        assert_matches!(
            parse_legacy_rules(json, Utc::now()),
            Err(LegacyImportError::DuplicateId(id)) if id == "x"
        );
    }

    #[test]
    fn non_array_file_is_rejected() {
        assert_matches!(
            parse_legacy_rules(r#"{"rules": []}"#, Utc::now()),
            Err(LegacyImportError::Json(_))
        );
        assert_matches!(parse_legacy_rules("not json", Utc::now()), Err(LegacyImportError::Json(_)));
    }
}
