//! Moderation post entity model and DTOs.

use modus_core::post::{
    PostStatus, Priority, SentimentLabel, MAX_EXCERPT_LENGTH, MAX_TITLE_LENGTH,
};
use modus_core::schema::{validate_embedding, validate_not_blank, validate_sentiment_score};
use modus_core::search::{PostSortField, SortOrder};
use modus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `moderation_posts` table.
#[derive(Debug, Clone, FromRow, Serialize, Validate)]
pub struct ModerationPost {
    pub id: DbId,
    #[validate(length(min = 1, max = MAX_TITLE_LENGTH))]
    pub title: String,
    pub body_content: String,
    #[validate(length(max = MAX_EXCERPT_LENGTH))]
    pub excerpt: Option<String>,
    pub category_id: Option<DbId>,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    #[validate(custom(function = "validate_sentiment_score"))]
    pub sentiment_score: f64,
    #[sqlx(try_from = "String")]
    pub sentiment_label: SentimentLabel,
    pub author_user_id: DbId,
    #[validate(range(min = 0))]
    pub author_post_count: i32,
    pub assigned_to_id: Option<DbId>,
    pub assigned_at: Option<Timestamp>,
    pub resolved_at: Option<Timestamp>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f64>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for ingesting a post.
///
/// Priority is not accepted: it is always derived by the rules engine.
/// Sentiment is computed from the text when omitted. `created_at` may be
/// backdated when importing posts from another system.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePost {
    #[validate(
        length(min = 1, max = MAX_TITLE_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub title: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub body_content: String,
    #[validate(length(max = MAX_EXCERPT_LENGTH))]
    pub excerpt: Option<String>,
    pub category_id: Option<DbId>,
    pub author_user_id: DbId,
    #[validate(range(min = 0))]
    pub author_post_count: Option<i32>,
    #[validate(custom(function = "validate_sentiment_score"))]
    pub sentiment_score: Option<f64>,
    pub sentiment_label: Option<SentimentLabel>,
    #[validate(custom(function = "validate_embedding"))]
    pub embedding: Option<Vec<f64>>,
    pub status: Option<PostStatus>,
    pub assigned_to_id: Option<DbId>,
    pub created_at: Option<Timestamp>,
}

/// Fully resolved values for a post insert, produced by the ingest pipeline.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body_content: String,
    pub excerpt: Option<String>,
    pub category_id: Option<DbId>,
    pub status: PostStatus,
    pub priority: Priority,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub author_user_id: DbId,
    pub author_post_count: i32,
    pub assigned_to_id: Option<DbId>,
    pub tags: Vec<String>,
    pub embedding: Option<Vec<f64>>,
    pub created_at: Timestamp,
}

/// DTO for updating a post's workflow fields. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdatePost {
    pub status: Option<PostStatus>,
    pub priority: Option<Priority>,
    pub category_id: Option<DbId>,
}

impl UpdatePost {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.category_id.is_none()
    }
}

/// Size of the open queue, reported by `/health`.
#[derive(Debug, Clone, Copy, FromRow, Serialize)]
pub struct QueueDepth {
    pub unresolved: i64,
    pub unassigned: i64,
}

/// Resolved filter for listing posts.
#[derive(Debug, Clone)]
pub struct PostQuery {
    pub category_id: Option<DbId>,
    pub status: Option<PostStatus>,
    pub priorities: Vec<Priority>,
    pub assigned_to_id: Option<DbId>,
    pub date_from: Option<Timestamp>,
    pub date_to: Option<Timestamp>,
    pub search: Option<String>,
    pub sort_by: PostSortField,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

impl Default for PostQuery {
    fn default() -> Self {
        Self {
            category_id: None,
            status: None,
            priorities: Vec::new(),
            assigned_to_id: None,
            date_from: None,
            date_to: None,
            search: None,
            sort_by: PostSortField::Priority,
            sort_order: SortOrder::Asc,
            limit: modus_core::search::DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}
