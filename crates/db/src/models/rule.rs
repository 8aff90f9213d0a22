//! Priority rule entity model and DTOs.

use modus_core::post::PostStatus;
use modus_core::rules::{ActionType, ConditionType, PriorityRule as EngineRule};
use modus_core::schema::{validate_not_blank, validate_sentiment_score};
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `priority_rules` table.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct PriorityRule {
    pub id: DbId,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub condition_type: ConditionType,
    pub condition_value: String,
    #[sqlx(try_from = "String")]
    pub action_type: ActionType,
    pub action_value: String,
    #[validate(range(min = 0))]
    pub position: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PriorityRule {
    /// Convert to the engine's representation.
    pub fn to_engine_rule(&self) -> EngineRule {
        EngineRule {
            id: self.id,
            name: self.name.clone(),
            condition_type: self.condition_type,
            condition_value: self.condition_value.clone(),
            action_type: self.action_type,
            action_value: self.action_value.clone(),
            position: self.position,
            is_active: self.is_active,
        }
    }
}

/// Convert a list of rows into engine rules.
pub fn to_engine_rules(rows: &[PriorityRule]) -> Vec<EngineRule> {
    rows.iter().map(PriorityRule::to_engine_rule).collect()
}

/// DTO for creating a rule. New rules are appended after the last position.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePriorityRule {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub condition_type: ConditionType,
    #[validate(length(max = 1000))]
    pub condition_value: String,
    pub action_type: ActionType,
    #[validate(length(max = 100))]
    pub action_value: String,
    pub is_active: Option<bool>,
}

/// DTO for updating a rule. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePriorityRule {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub condition_type: Option<ConditionType>,
    #[validate(length(max = 1000))]
    pub condition_value: Option<String>,
    pub action_type: Option<ActionType>,
    #[validate(length(max = 100))]
    pub action_value: Option<String>,
    #[validate(range(min = 0))]
    pub position: Option<i32>,
    pub is_active: Option<bool>,
}

/// Request body for `POST /rules/reorder`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderRules {
    #[validate(length(min = 1))]
    pub rule_ids: Vec<DbId>,
}

/// Sample post evaluated by `POST /rules/test`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RuleTestRequest {
    #[validate(length(max = 500))]
    pub title: String,
    #[serde(default)]
    pub body_content: String,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub author_post_count: i32,
    #[validate(custom(function = "validate_sentiment_score"))]
    pub sentiment_score: Option<f64>,
    pub category_id: Option<DbId>,
    pub status: Option<PostStatus>,
    /// Defaults to now.
    pub created_at: Option<Timestamp>,
    /// Evaluate a single rule instead of every rule.
    pub rule_id: Option<DbId>,
}
