//! Row model for the `rules` table.

use frontdoor_core::rules::{Assignee, Condition, Rule};
use frontdoor_core::types::Timestamp;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `rules` table. Conditions and assignee are JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct RuleRow {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub conditions: Json<Vec<Condition>>,
    pub assignee: Json<Assignee>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<RuleRow> for Rule {
    fn from(row: RuleRow) -> Self {
        Rule {
            id: row.id,
            name: row.name,
            active: row.active,
            conditions: row.conditions.0,
            assignee: row.assignee.0,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
