//! Repository for the `responses` table.

use modus_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::response::{Response, ResponseCandidate};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, post_id, agent_id, content, is_internal_note, created_at, updated_at";

/// Provides CRUD operations for post responses.
pub struct ResponseRepo;

impl ResponseRepo {
    /// All responses of a post, oldest first.
    pub async fn list_for_post(pool: &PgPool, post_id: DbId) -> Result<Vec<Response>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM responses WHERE post_id = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(post_id)
            .fetch_all(pool)
            .await
    }

    /// Public responses on other posts of the same category (both
    /// uncategorised counts as the same), newest first.
    pub async fn candidates_for_suggestion(
        pool: &PgPool,
        post_id: DbId,
        category_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<ResponseCandidate>, sqlx::Error> {
        sqlx::query_as::<_, ResponseCandidate>(
            "SELECT r.id, r.post_id, r.agent_id, r.content, r.is_internal_note,
                    r.created_at, r.updated_at, p.embedding AS post_embedding
             FROM responses r
             JOIN moderation_posts p ON p.id = r.post_id
             WHERE r.post_id <> $1
               AND p.category_id IS NOT DISTINCT FROM $2
               AND NOT r.is_internal_note
             ORDER BY r.created_at DESC
             LIMIT $3",
        )
        .bind(post_id)
        .bind(category_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Response>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM responses WHERE id = $1");
        sqlx::query_as::<_, Response>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert an already sanitized response.
    pub async fn create(
        executor: impl PgExecutor<'_>,
        post_id: DbId,
        agent_id: DbId,
        content: &str,
        is_internal_note: bool,
    ) -> Result<Response, sqlx::Error> {
        let query = format!(
            "INSERT INTO responses (post_id, agent_id, content, is_internal_note)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(post_id)
            .bind(agent_id)
            .bind(content)
            .bind(is_internal_note)
            .fetch_one(executor)
            .await
    }

    /// Update content and/or the internal-note flag.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        content: Option<&str>,
        is_internal_note: Option<bool>,
    ) -> Result<Option<Response>, sqlx::Error> {
        let query = format!(
            "UPDATE responses SET
                content = COALESCE($2, content),
                is_internal_note = COALESCE($3, is_internal_note)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(id)
            .bind(content)
            .bind(is_internal_note)
            .fetch_optional(executor)
            .await
    }

    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM responses WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
