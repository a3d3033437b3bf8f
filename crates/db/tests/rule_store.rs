//! Behavioural tests for `RuleStore` against an in-memory SQLite database.

use std::sync::Arc;

use frontdoor_core::matcher::{match_rule, NormalizedRequest};
use frontdoor_core::rules::{
    Assignee, Condition, ConditionField, ConditionOperator, Rule, RuleInput, RulePatch,
};
use frontdoor_db::{DeleteOutcome, RuleStore};

async fn store() -> RuleStore {
    let pool = frontdoor_db::create_memory_pool()
        .await
        .expect("in-memory pool");
    RuleStore::new(pool)
}

fn sales_au_input() -> RuleInput {
    RuleInput {
        name: "Sales AU".to_string(),
        active: true,
        conditions: vec![
            Condition::new(ConditionField::Location, ConditionOperator::Equals, "Australia"),
            Condition::new(ConditionField::RequestType, ConditionOperator::Equals, "contract"),
        ],
        assignee: Assignee {
            name: "Jane".to_string(),
            email: "jane@acme.corp".to_string(),
        },
        notes: None,
    }
}

fn named_input(name: &str) -> RuleInput {
    RuleInput {
        name: name.to_string(),
        ..sales_au_input()
    }
}

// ---------------------------------------------------------------------------
// create / list
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_identity_and_equal_timestamps() {
    let store = store().await;

    let rule = store.create(sales_au_input()).await.unwrap();

    assert!(!rule.id.is_empty());
    assert_eq!(rule.created_at, rule.updated_at);
    assert_eq!(rule.name, "Sales AU");

    let request = NormalizedRequest::new()
        .with(ConditionField::Location, "australia")
        .with(ConditionField::RequestType, "Contract");
    let rules = [rule.clone()];
    assert_eq!(match_rule(&request, &rules).map(|r| &r.id), Some(&rule.id));
}

#[tokio::test]
async fn create_then_list_round_trips() {
    let store = store().await;
    let input = sales_au_input();

    let created = store.create(input.clone()).await.unwrap();
    let listed = store.list().await.unwrap();

    assert_eq!(listed.len(), 1);
    let stored = &listed[0];
    assert_eq!(stored, &created);
    assert_eq!(stored.name, input.name);
    assert_eq!(stored.active, input.active);
    assert_eq!(stored.conditions, input.conditions);
    assert_eq!(stored.assignee, input.assignee);
    assert_eq!(stored.notes, input.notes);
}

#[tokio::test]
async fn whitespace_notes_round_trip_unchanged() {
    let store = store().await;
    let input = RuleInput {
        notes: Some("  ".to_string()),
        ..sales_au_input()
    };

    let created = store.create(input).await.unwrap();
    let stored = store.get(&created.id).await.unwrap().unwrap();

    assert_eq!(stored.notes.as_deref(), Some("  "));
}

#[tokio::test]
async fn list_preserves_insertion_order() {
    let store = store().await;
    for name in ["first", "second", "third"] {
        store.create(named_input(name)).await.unwrap();
    }

    let names: Vec<String> = store
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();

    assert_eq!(names, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn create_prunes_blank_conditions() {
    let store = store().await;
    let mut input = sales_au_input();
    input.conditions.push(Condition::new(
        ConditionField::Department,
        ConditionOperator::Equals,
        "  ",
    ));

    let rule = store.create(input).await.unwrap();

    assert_eq!(rule.conditions.len(), 2);
    assert!(rule
        .conditions
        .iter()
        .all(|c| c.field != ConditionField::Department));
}

// ---------------------------------------------------------------------------
// update
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_merges_and_preserves_identity() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    let patch: RulePatch = serde_json::from_value(serde_json::json!({
        "id": "forged",
        "createdAt": "2000-01-01T00:00:00Z",
        "name": "Sales ANZ"
    }))
    .unwrap();
    let updated = store.update(&created.id, patch).await.unwrap().unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.name, "Sales ANZ");
    assert_eq!(updated.conditions, created.conditions);
    assert_eq!(updated.assignee, created.assignee);

    let stored = store.get(&created.id).await.unwrap().unwrap();
    assert_eq!(stored, updated);
}

#[tokio::test]
async fn successive_updates_strictly_increase_updated_at() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    let mut previous = created.updated_at;
    for i in 0..5 {
        let patch = RulePatch {
            active: Some(i % 2 == 0),
            ..RulePatch::default()
        };
        let updated = store.update(&created.id, patch).await.unwrap().unwrap();
        assert!(updated.updated_at > previous);
        previous = updated.updated_at;
    }
}

#[tokio::test]
async fn update_unknown_id_returns_none_and_creates_nothing() {
    let store = store().await;
    store.create(sales_au_input()).await.unwrap();

    let result = store
        .update(
            "nonexistent-id",
            RulePatch {
                name: Some("Ghost".into()),
                ..RulePatch::default()
            },
        )
        .await
        .unwrap();

    assert!(result.is_none());
    let rules = store.list().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].name, "Sales AU");
}

#[tokio::test]
async fn deactivated_rule_is_still_listed() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    store
        .update(
            &created.id,
            RulePatch {
                active: Some(false),
                ..RulePatch::default()
            },
        )
        .await
        .unwrap();

    let rules = store.list().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert!(!rules[0].active);

    let request = NormalizedRequest::new()
        .with(ConditionField::Location, "Australia")
        .with(ConditionField::RequestType, "contract");
    assert!(match_rule(&request, &rules).is_none());
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delete_removes_rule() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    assert!(store.delete(&created.id).await.unwrap());
    assert!(store.list().await.unwrap().is_empty());
    assert!(store.get(&created.id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_if_named_checks_the_current_name() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    let rename: RulePatch =
        serde_json::from_value(serde_json::json!({ "name": "Sales ANZ" })).unwrap();
    store.update(&created.id, rename).await.unwrap();

    let stale = store.delete_if_named(&created.id, "Sales AU").await.unwrap();
    assert_eq!(stale, DeleteOutcome::NameMismatch);
    assert_eq!(store.list().await.unwrap().len(), 1);

    let confirmed = store.delete_if_named(&created.id, " Sales ANZ ").await.unwrap();
    assert_eq!(confirmed, DeleteOutcome::Deleted);
    assert!(store.list().await.unwrap().is_empty());

    let gone = store.delete_if_named(&created.id, "Sales ANZ").await.unwrap();
    assert_eq!(gone, DeleteOutcome::NotFound);
}

#[tokio::test]
async fn delete_unknown_id_returns_false_and_leaves_store_unchanged() {
    let store = store().await;
    let created = store.create(sales_au_input()).await.unwrap();

    assert!(!store.delete("nonexistent-id").await.unwrap());

    let rules = store.list().await.unwrap();
    assert_eq!(rules, vec![created]);
}

// ---------------------------------------------------------------------------
// concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn concurrent_creates_are_not_lost() {
    let store = Arc::new(store().await);

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.create(named_input(&format!("rule-{i}"))).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let rules = store.list().await.unwrap();
    assert_eq!(rules.len(), 20);

    let mut ids: Vec<&str> = rules.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
}

// ---------------------------------------------------------------------------
// import
// ---------------------------------------------------------------------------

#[tokio::test]
async fn import_seeds_only_an_empty_store() {
    let store = store().await;
    let now = chrono::Utc::now();
    let seeded: Vec<Rule> = ["a", "b"]
        .into_iter()
        .map(|id| Rule::from_input(id.to_string(), named_input(id), now))
        .collect();

    assert_eq!(store.import_if_empty(seeded.clone()).await.unwrap(), 2);
    let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
    assert_eq!(ids, vec!["a", "b"]);

    assert_eq!(store.import_if_empty(seeded).await.unwrap(), 0);
    assert_eq!(store.list().await.unwrap().len(), 2);
}
