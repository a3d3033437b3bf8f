//! Repository for the `rules` table.
//!
//! Stateless SQL access. Callers pass either the pool or an open transaction;
//! serialization of writes is the job of [`crate::RuleStore`].

use frontdoor_core::rules::Rule;
use sqlx::types::Json;
use sqlx::SqliteExecutor;

use crate::models::rule::RuleRow;

/// Column list for `rules` queries.
const COLUMNS: &str = "id, name, active, conditions, assignee, notes, created_at, updated_at";

/// Provides data access for routing rules.
pub struct RuleRepo;

impl RuleRepo {
    /// List every rule in store order.
    pub async fn list<'e, E>(executor: E) -> Result<Vec<RuleRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM rules ORDER BY position");
        sqlx::query_as::<_, RuleRow>(&query)
            .fetch_all(executor)
            .await
    }

    /// Find a rule by its ID.
    pub async fn find_by_id<'e, E>(executor: E, id: &str) -> Result<Option<RuleRow>, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM rules WHERE id = ?1");
        sqlx::query_as::<_, RuleRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Append a rule at the end of the store order.
    pub async fn insert<'e, E>(executor: E, rule: &Rule) -> Result<(), sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            "INSERT INTO rules \
                 (id, name, active, conditions, assignee, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&rule.id)
        .bind(&rule.name)
        .bind(rule.active)
        .bind(Json(&rule.conditions))
        .bind(Json(&rule.assignee))
        .bind(&rule.notes)
        .bind(rule.created_at)
        .bind(rule.updated_at)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Overwrite the mutable columns of an existing rule.
    ///
    /// `id`, `created_at` and `position` are never written. Returns `true`
    /// if a row was updated.
    pub async fn update<'e, E>(executor: E, rule: &Rule) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            "UPDATE rules SET \
                 name = ?2, \
                 active = ?3, \
                 conditions = ?4, \
                 assignee = ?5, \
                 notes = ?6, \
                 updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(&rule.id)
        .bind(&rule.name)
        .bind(rule.active)
        .bind(Json(&rule.conditions))
        .bind(Json(&rule.assignee))
        .bind(&rule.notes)
        .bind(rule.updated_at)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a rule by ID.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete<'e, E>(executor: E, id: &str) -> Result<bool, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM rules WHERE id = ?1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of stored rules.
    pub async fn count<'e, E>(executor: E) -> Result<i64, sqlx::Error>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rules")
            .fetch_one(executor)
            .await
    }
}
