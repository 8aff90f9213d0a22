//! Repository for the `categories` table.

use modus_core::schema::slugify;
use modus_core::types::DbId;
use sqlx::PgPool;

use crate::models::category::{Category, CreateCategory, UpdateCategory, DEFAULT_CATEGORY_COLOR};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, name, slug, description, color, icon, position, is_active, created_at, updated_at";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List categories in display order. Inactive ones are included only on request.
    pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE is_active OR $1
             ORDER BY position ASC, name ASC"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(include_inactive)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a category. The slug defaults to one derived from the name and
    /// the position defaults to after the last category.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let slug = input
            .slug
            .clone()
            .unwrap_or_else(|| slugify(&input.name));
        let query = format!(
            "INSERT INTO categories (name, slug, description, color, icon, position, is_active)
             SELECT $1, $2, $3, COALESCE($4, '{DEFAULT_CATEGORY_COLOR}'), $5,
                    COALESCE($6, COALESCE(MAX(position), 0) + 1), COALESCE($7, TRUE)
             FROM categories
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(slug)
            .bind(&input.description)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(input.position)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Update a category. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                description = COALESCE($4, description),
                color = COALESCE($5, color),
                icon = COALESCE($6, icon),
                position = COALESCE($7, position),
                is_active = COALESCE($8, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.slug)
            .bind(&input.description)
            .bind(&input.color)
            .bind(&input.icon)
            .bind(input.position)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category. Posts and templates in it become uncategorised.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply `(id, position)` pairs in one transaction. Unknown ids are skipped.
    pub async fn reorder(
        pool: &PgPool,
        positions: &[(DbId, i32)],
    ) -> Result<Vec<Category>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        for (id, position) in positions {
            sqlx::query("UPDATE categories SET position = $2 WHERE id = $1")
                .bind(id)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        Self::list(pool, true).await
    }
}
