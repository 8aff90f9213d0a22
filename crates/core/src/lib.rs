//! Modus core domain logic.
//!
//! Pure logic with no database or HTTP dependencies: domain enums, the
//! priority-rule engine, content sanitization, keyword sentiment analysis,
//! response suggestions, response-template placeholders, upload validation, and schema helpers
//! shared by the `modus-db` models.

#[macro_use]
mod macros;

pub mod agent;
pub mod audit;
pub mod error;
pub mod post;
pub mod rules;
pub mod schema;
pub mod search;
pub mod security;
pub mod sentiment;
pub mod suggest;
pub mod template;
pub mod types;
pub mod uploads;
