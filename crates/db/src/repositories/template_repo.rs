//! Repository for the `response_templates` table.

use modus_core::types::DbId;
use sqlx::PgPool;

use crate::models::template::ResponseTemplate;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, name, content, placeholders, category_id, usage_count, \
    created_by, created_at, updated_at";

/// Provides CRUD operations for response templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// List templates, most used first, optionally restricted to a category.
    pub async fn list(
        pool: &PgPool,
        category_id: Option<DbId>,
    ) -> Result<Vec<ResponseTemplate>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM response_templates
             WHERE ($1::UUID IS NULL OR category_id = $1)
             ORDER BY usage_count DESC, name ASC"
        );
        sqlx::query_as::<_, ResponseTemplate>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ResponseTemplate>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM response_templates WHERE id = $1");
        sqlx::query_as::<_, ResponseTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a template with its resolved placeholder list.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        content: &str,
        placeholders: &[String],
        category_id: Option<DbId>,
        created_by: DbId,
    ) -> Result<ResponseTemplate, sqlx::Error> {
        let query = format!(
            "INSERT INTO response_templates (name, content, placeholders, category_id, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResponseTemplate>(&query)
            .bind(name)
            .bind(content)
            .bind(placeholders)
            .bind(category_id)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Update a template. Only non-`None` arguments are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        name: Option<&str>,
        content: Option<&str>,
        placeholders: Option<&[String]>,
        category_id: Option<DbId>,
    ) -> Result<Option<ResponseTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE response_templates SET
                name = COALESCE($2, name),
                content = COALESCE($3, content),
                placeholders = COALESCE($4, placeholders),
                category_id = COALESCE($5, category_id)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResponseTemplate>(&query)
            .bind(id)
            .bind(name)
            .bind(content)
            .bind(placeholders)
            .bind(category_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM response_templates WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump the usage counter and return the updated row.
    pub async fn increment_usage(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ResponseTemplate>, sqlx::Error> {
        let query = format!(
            "UPDATE response_templates SET usage_count = usage_count + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ResponseTemplate>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
