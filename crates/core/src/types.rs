/// Rule identifiers are opaque strings (UUID v4 when minted by the store).
pub type RuleId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Mint a fresh rule identifier.
pub fn new_rule_id() -> RuleId {
    uuid::Uuid::new_v4().to_string()
}
