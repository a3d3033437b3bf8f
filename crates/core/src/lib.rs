//! Routing-rule domain logic for the legal front door.
//!
//! Pure types and functions only: the rule data model, edit-boundary
//! validation, the matcher, prompt composition, and chat message
//! sanitising. Persistence lives in `frontdoor-db`, transport in
//! `frontdoor-api`.

pub mod chat;
pub mod error;
pub mod legacy;
pub mod matcher;
pub mod prompt;
pub mod rules;
pub mod types;
pub mod validation;
