//! Response template entity model and DTOs.

use std::collections::HashMap;

use modus_core::schema::validate_not_blank;
use modus_core::template::MAX_PLACEHOLDERS;
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `response_templates` table.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct ResponseTemplate {
    pub id: DbId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub content: String,
    pub placeholders: Vec<String>,
    pub category_id: Option<DbId>,
    #[validate(range(min = 0))]
    pub usage_count: i32,
    pub created_by: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating a template.
///
/// When `placeholders` is omitted the list is derived from the content.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplate {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 10000), custom(function = "validate_not_blank"))]
    pub content: String,
    #[validate(custom(function = "validate_placeholder_names"))]
    pub placeholders: Option<Vec<String>>,
    pub category_id: Option<DbId>,
}

/// DTO for updating a template. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTemplate {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 10000), custom(function = "validate_not_blank"))]
    pub content: Option<String>,
    #[validate(custom(function = "validate_placeholder_names"))]
    pub placeholders: Option<Vec<String>>,
    pub category_id: Option<DbId>,
}

/// Request body for `POST /templates/{id}/use`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UseTemplate {
    #[serde(default)]
    pub values: HashMap<String, String>,
}

/// Placeholder lists are short, unique and made of identifier-like names.
fn validate_placeholder_names(names: &[String]) -> Result<(), ValidationError> {
    let err = |message: &'static str| {
        let mut e = ValidationError::new("placeholders");
        e.message = Some(message.into());
        Err(e)
    };

    if names.len() > MAX_PLACEHOLDERS {
        return err("too many placeholders");
    }
    let valid_name = |n: &String| {
        let mut chars = n.chars();
        matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if !names.iter().all(valid_name) {
        return err("placeholder names must be letters, digits and underscores");
    }
    let mut sorted: Vec<&String> = names.iter().collect();
    sorted.sort();
    sorted.dedup();
    if sorted.len() != names.len() {
        return err("placeholder names must be unique");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modus_core::schema::check;

    fn create(placeholders: Option<Vec<&str>>) -> CreateTemplate {
        CreateTemplate {
            name: "Welcome".to_string(),
            content: "Hi {{authorName}}".to_string(),
            placeholders: placeholders.map(|p| p.into_iter().map(String::from).collect()),
            category_id: None,
        }
    }

    #[test]
    fn accepts_missing_or_valid_placeholders() {
        assert!(check(&create(None)).is_ok());
        assert!(check(&create(Some(vec!["authorName", "ticket_id"]))).is_ok());
    }

    #[test]
    fn rejects_bad_placeholder_names() {
        let err = check(&create(Some(vec!["author name"]))).unwrap_err();
        assert!(err.to_string().contains("placeholders:"));
        assert!(check(&create(Some(vec!["a", "a"]))).is_err());
    }

    #[test]
    fn entity_rejects_negative_usage_count() {
        let now = chrono::Utc::now();
        let mut template = ResponseTemplate {
            id: DbId::new_v4(),
            name: "Welcome".to_string(),
            content: "Hi {{authorName}}".to_string(),
            placeholders: vec!["authorName".to_string()],
            category_id: None,
            usage_count: 0,
            created_by: DbId::new_v4(),
            created_at: now,
            updated_at: now,
        };
        assert!(check(&template).is_ok());

        template.usage_count = -1;
        assert!(check(&template)
            .unwrap_err()
            .to_string()
            .contains("usage_count:"));
    }

    #[test]
    fn use_body_defaults_to_no_values() {
        let body: UseTemplate = serde_json::from_str("{}").unwrap();
        assert!(body.values.is_empty());
    }
}
