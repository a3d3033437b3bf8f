pub mod chat;
pub mod route;
pub mod rules;
