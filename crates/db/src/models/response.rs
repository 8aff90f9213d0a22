//! Response entity model and DTOs.

use modus_core::schema::validate_not_blank;
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Maximum response length in characters.
pub const MAX_RESPONSE_LENGTH: u64 = 10_000;

/// A row from the `responses` table.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct Response {
    pub id: DbId,
    pub post_id: DbId,
    pub agent_id: DbId,
    #[validate(length(min = 1))]
    pub content: String,
    pub is_internal_note: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A response from another post, with that post's embedding for ranking.
#[derive(Debug, Clone, FromRow)]
pub struct ResponseCandidate {
    #[sqlx(flatten)]
    pub response: Response,
    pub post_embedding: Option<Vec<f64>>,
}

/// Request body for `POST /posts/{id}/responses`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateResponse {
    #[validate(
        length(min = 1, max = MAX_RESPONSE_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub content: String,
    #[serde(default)]
    pub is_internal_note: bool,
}

/// DTO for editing a response. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateResponse {
    #[validate(
        length(min = 1, max = MAX_RESPONSE_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub content: Option<String>,
    pub is_internal_note: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use modus_core::schema::check;

    #[test]
    fn internal_note_defaults_to_false() {
        let input: CreateResponse = serde_json::from_str(r#"{"content":"Hi"}"#).unwrap();
        assert!(!input.is_internal_note);
        assert!(check(&input).is_ok());
    }

    #[test]
    fn rejects_empty_content() {
        let input = CreateResponse {
            content: "  ".to_string(),
            is_internal_note: false,
        };
        assert!(check(&input).unwrap_err().to_string().contains("content:"));
    }

    #[test]
    fn update_without_fields_is_valid() {
        assert!(check(&UpdateResponse::default()).is_ok());
    }
}
