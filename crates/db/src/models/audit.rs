//! Audit log entity model and DTOs.

use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub agent_id: DbId,
    pub post_id: Option<DbId>,
    pub action_type: String,
    pub action_details: serde_json::Value,
    pub previous_state: Option<serde_json::Value>,
    pub new_state: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for appending an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub agent_id: DbId,
    pub post_id: Option<DbId>,
    pub action_type: &'static str,
    pub action_details: serde_json::Value,
    pub previous_state: Option<serde_json::Value>,
    pub new_state: Option<serde_json::Value>,
}

impl CreateAuditLog {
    /// Entry with empty details and no state snapshots.
    pub fn new(agent_id: DbId, action_type: &'static str) -> Self {
        Self {
            agent_id,
            post_id: None,
            action_type,
            action_details: serde_json::json!({}),
            previous_state: None,
            new_state: None,
        }
    }

    pub fn post(mut self, post_id: DbId) -> Self {
        self.post_id = Some(post_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.action_details = details;
        self
    }

    pub fn states(
        mut self,
        previous: Option<serde_json::Value>,
        new: Option<serde_json::Value>,
    ) -> Self {
        self.previous_state = previous;
        self.new_state = new;
        self
    }
}

/// Query parameters for `GET /audit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub agent_id: Option<DbId>,
    pub post_id: Option<DbId>,
    pub action_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
