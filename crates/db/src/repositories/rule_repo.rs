//! Repository for the `priority_rules` table.

use modus_core::types::DbId;
use sqlx::{PgConnection, PgExecutor, PgPool};

use crate::models::rule::{CreatePriorityRule, PriorityRule, UpdatePriorityRule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, condition_type, condition_value, \
    action_type, action_value, position, is_active, created_at, updated_at";

/// Provides CRUD and ordering operations for priority rules.
pub struct PriorityRuleRepo;

impl PriorityRuleRepo {
    /// List every rule in evaluation order.
    pub async fn list(executor: impl PgExecutor<'_>) -> Result<Vec<PriorityRule>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM priority_rules ORDER BY position ASC, created_at ASC");
        sqlx::query_as::<_, PriorityRule>(&query)
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PriorityRule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM priority_rules WHERE id = $1");
        sqlx::query_as::<_, PriorityRule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a rule after the current last position (or at 1 if none exist).
    pub async fn create(
        executor: impl PgExecutor<'_>,
        input: &CreatePriorityRule,
    ) -> Result<PriorityRule, sqlx::Error> {
        let query = format!(
            "INSERT INTO priority_rules
                (name, description, condition_type, condition_value,
                 action_type, action_value, position, is_active)
             SELECT $1, $2, $3, $4, $5, $6, COALESCE(MAX(position), 0) + 1, COALESCE($7, TRUE)
             FROM priority_rules
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PriorityRule>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.condition_type.as_str())
            .bind(&input.condition_value)
            .bind(input.action_type.as_str())
            .bind(&input.action_value)
            .bind(input.is_active)
            .fetch_one(executor)
            .await
    }

    /// Update a rule. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        input: &UpdatePriorityRule,
    ) -> Result<Option<PriorityRule>, sqlx::Error> {
        let query = format!(
            "UPDATE priority_rules SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                condition_type = COALESCE($4, condition_type),
                condition_value = COALESCE($5, condition_value),
                action_type = COALESCE($6, action_type),
                action_value = COALESCE($7, action_value),
                position = COALESCE($8, position),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PriorityRule>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.condition_type.map(|c| c.as_str()))
            .bind(&input.condition_value)
            .bind(input.action_type.map(|a| a.as_str()))
            .bind(&input.action_value)
            .bind(input.position)
            .bind(input.is_active)
            .fetch_optional(executor)
            .await
    }

    /// Delete a rule by ID. Returns `true` if a row was removed.
    pub async fn delete(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM priority_rules WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Apply `(id, position)` pairs and return the full, re-ordered list.
    /// Ids that do not exist are skipped.
    ///
    /// Runs on the caller's connection; pass a transaction so a failure part
    /// way through leaves the old order intact.
    pub async fn reorder(
        conn: &mut PgConnection,
        positions: &[(DbId, i32)],
    ) -> Result<Vec<PriorityRule>, sqlx::Error> {
        for (id, position) in positions {
            sqlx::query("UPDATE priority_rules SET position = $2 WHERE id = $1")
                .bind(id)
                .bind(position)
                .execute(&mut *conn)
                .await?;
        }
        Self::list(&mut *conn).await
    }
}
