//! Agent entity model and DTOs.

use modus_core::agent::{AgentRole, AgentStatus};
use modus_core::schema::validate_not_blank;
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `agents` table.
///
/// `password_hash` is loaded for login verification but never serialized.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct Agent {
    pub id: DbId,
    pub user_id: DbId,
    #[validate(email)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[validate(length(min = 1, max = 100))]
    pub display_name: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: AgentRole,
    #[sqlx(try_from = "String")]
    pub status: AgentStatus,
    pub last_active_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting an agent. `password_hash` must already be hashed.
#[derive(Debug, Clone, Validate)]
pub struct CreateAgent {
    #[validate(email)]
    pub email: String,
    pub password_hash: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub display_name: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub role: AgentRole,
}

/// DTO for updating an agent. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateAgent {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub display_name: Option<String>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub role: Option<AgentRole>,
    pub status: Option<AgentStatus>,
}

impl UpdateAgent {
    /// Whether the patch touches anything besides `status`.
    pub fn changes_profile(&self) -> bool {
        self.display_name.is_some() || self.avatar_url.is_some() || self.role.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modus_core::schema::check;

    #[test]
    fn rejects_invalid_email() {
        let input = CreateAgent {
            email: "not-an-email".to_string(),
            password_hash: "hash".to_string(),
            display_name: "Sam".to_string(),
            avatar_url: None,
            role: AgentRole::Agent,
        };
        assert!(check(&input).unwrap_err().to_string().contains("email:"));
    }

    #[test]
    fn rejects_bad_avatar_url() {
        let input = UpdateAgent {
            avatar_url: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(check(&input).unwrap_err().to_string().contains("avatar_url:"));
    }

    #[test]
    fn status_only_patch_is_not_a_profile_change() {
        let status_only = UpdateAgent {
            status: Some(AgentStatus::Busy),
            ..Default::default()
        };
        assert!(!status_only.changes_profile());

        let promote = UpdateAgent {
            role: Some(AgentRole::Supervisor),
            ..Default::default()
        };
        assert!(promote.changes_profile());
    }

    #[test]
    fn unknown_role_is_rejected_on_deserialize() {
        let result = serde_json::from_str::<UpdateAgent>(r#"{"role":"superuser"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let agent = Agent {
            id: DbId::new_v4(),
            user_id: DbId::new_v4(),
            email: "sam@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: "Sam".to_string(),
            avatar_url: None,
            role: AgentRole::Admin,
            status: AgentStatus::Online,
            last_active_at: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&agent).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "admin");
    }
}
