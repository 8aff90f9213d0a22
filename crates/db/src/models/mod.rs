//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Entities and DTOs derive `validator::Validate`; callers run them through
//! `modus_core::schema::check` to get a single `"<path>: <message>"` error.

pub mod agent;
pub mod audit;
pub mod category;
pub mod post;
pub mod response;
pub mod rule;
pub mod template;
