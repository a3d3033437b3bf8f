//! Legal front door API server library.
//!
//! Exposes config, state, error handling, routes and the seed importer so
//! integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
