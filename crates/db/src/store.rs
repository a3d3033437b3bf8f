//! The authoritative rule collection.
//!
//! [`RuleStore`] is the only writer of rule ids and timestamps. Each mutation
//! runs as one read-modify-write transaction while holding a store-wide write
//! lock, so mutations never interleave and a failed commit leaves nothing
//! half-applied. Reads go straight to the pool.

use chrono::{SubsecRound, Utc};
use frontdoor_core::rules::{Rule, RuleInput, RulePatch};
use frontdoor_core::types::{new_rule_id, Timestamp};
use frontdoor_core::validation::confirm_delete;
use tokio::sync::Mutex;

use crate::repositories::RuleRepo;
use crate::DbPool;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a name-confirmed delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// The confirmation did not match the rule's current name; nothing was removed.
    NameMismatch,
}

pub struct RuleStore {
    pool: DbPool,
    write_lock: Mutex<()>,
}

impl RuleStore {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// All rules, active and inactive, in store order.
    pub async fn list(&self) -> Result<Vec<Rule>, StoreError> {
        let rows = RuleRepo::list(&self.pool).await?;
        Ok(rows.into_iter().map(Rule::from).collect())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Rule>, StoreError> {
        let row = RuleRepo::find_by_id(&self.pool, id).await?;
        Ok(row.map(Rule::from))
    }

    /// Append a new rule. Blank-valued conditions are dropped; no business
    /// validation happens here.
    pub async fn create(&self, input: RuleInput) -> Result<Rule, StoreError> {
        let _guard = self.write_lock.lock().await;
        let rule = Rule::from_input(new_rule_id(), input.pruned(), now());

        let mut tx = self.pool.begin().await?;
        RuleRepo::insert(&mut *tx, &rule).await?;
        tx.commit().await?;

        tracing::debug!(rule_id = %rule.id, name = %rule.name, "Rule stored");
        Ok(rule)
    }

    /// Merge `patch` onto the stored rule. Returns `None` when `id` is unknown.
    ///
    /// `updated_at` strictly increases across successive updates even when
    /// the clock has not visibly advanced.
    pub async fn update(&self, id: &str, patch: RulePatch) -> Result<Option<Rule>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let Some(row) = RuleRepo::find_by_id(&mut *tx, id).await? else {
            return Ok(None);
        };
        let mut rule = Rule::from(row);
        rule.apply_patch(patch.pruned());
        rule.updated_at = next_timestamp(rule.updated_at);

        RuleRepo::update(&mut *tx, &rule).await?;
        tx.commit().await?;

        tracing::debug!(rule_id = %rule.id, updated_at = %rule.updated_at, "Rule updated");
        Ok(Some(rule))
    }

    /// Remove a rule. Returns `false` when `id` is unknown.
    pub async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let removed = RuleRepo::delete(&mut *tx, id).await?;
        tx.commit().await?;

        if removed {
            tracing::debug!(rule_id = %id, "Rule removed");
        }
        Ok(removed)
    }

    /// Remove a rule only if `confirmation` matches its current name.
    ///
    /// The name check and the delete run under the same write lock and
    /// transaction, so a concurrent rename cannot slip in between.
    pub async fn delete_if_named(
        &self,
        id: &str,
        confirmation: &str,
    ) -> Result<DeleteOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        let Some(row) = RuleRepo::find_by_id(&mut *tx, id).await? else {
            return Ok(DeleteOutcome::NotFound);
        };
        if confirm_delete(&row.name, confirmation).is_err() {
            return Ok(DeleteOutcome::NameMismatch);
        }

        RuleRepo::delete(&mut *tx, id).await?;
        tx.commit().await?;

        tracing::debug!(rule_id = %id, "Rule removed after name confirmation");
        Ok(DeleteOutcome::Deleted)
    }

    /// Seed an empty store with pre-built rules, keeping their ids and
    /// timestamps. Does nothing if any rule already exists. Returns the
    /// number of rules inserted.
    pub async fn import_if_empty(&self, rules: Vec<Rule>) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;

        if RuleRepo::count(&mut *tx).await? > 0 {
            return Ok(0);
        }
        for rule in &rules {
            RuleRepo::insert(&mut *tx, rule).await?;
        }
        tx.commit().await?;

        Ok(rules.len())
    }
}

/// Current time at the microsecond precision the store round-trips.
fn now() -> Timestamp {
    Utc::now().trunc_subsecs(6)
}

fn next_timestamp(previous: Timestamp) -> Timestamp {
    let now = now();
    if now > previous {
        now
    } else {
        previous + chrono::Duration::microseconds(1)
    }
}
