//! Category entity model and DTOs.

use modus_core::schema::{validate_hex_color, validate_not_blank, validate_slug};
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Colour given to categories created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6b7280";

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct Category {
    pub id: DbId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,
    pub icon: Option<String>,
    #[validate(range(min = 0))]
    pub position: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a category. The slug is derived from the name when omitted.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    /// Appended after the last category when omitted.
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// DTO for updating a category. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100), custom(function = "validate_slug"))]
    pub slug: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /categories/reorder`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderCategories {
    #[validate(length(min = 1))]
    pub category_ids: Vec<DbId>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use modus_core::schema::check;

    fn create(name: &str) -> CreateCategory {
        CreateCategory {
            name: name.to_string(),
            slug: None,
            description: None,
            color: None,
            icon: None,
            position: None,
            is_active: None,
        }
    }

    #[test]
    fn minimal_create_is_valid() {
        assert!(check(&create("Bug Reports")).is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let err = check(&create("   ")).unwrap_err();
        assert!(err.to_string().contains("name: must not be blank"));
    }

    #[test]
    fn rejects_bad_color_and_slug() {
        let mut input = create("Bugs");
        input.color = Some("red".to_string());
        assert!(check(&input).unwrap_err().to_string().contains("color:"));

        let mut input = create("Bugs");
        input.slug = Some("Bug Reports".to_string());
        assert!(check(&input).unwrap_err().to_string().contains("slug:"));
    }

    #[test]
    fn rejects_negative_position() {
        let mut input = create("Bugs");
        input.position = Some(-1);
        assert!(check(&input).unwrap_err().to_string().contains("position:"));
    }

    #[test]
    fn reorder_requires_ids() {
        let input = ReorderCategories {
            category_ids: Vec::new(),
        };
        assert!(check(&input).is_err());
    }
}
