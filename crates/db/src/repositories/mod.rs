pub mod rule_repo;

pub use rule_repo::RuleRepo;
