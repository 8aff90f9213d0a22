//! Repository for the `agents` table.

use modus_core::agent::AgentRole;
use modus_core::types::DbId;
use sqlx::PgPool;

use crate::models::agent::{Agent, CreateAgent, UpdateAgent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, email, password_hash, display_name, avatar_url, \
    role, status, last_active_at, created_at, updated_at";

/// Provides CRUD operations for agents.
pub struct AgentRepo;

impl AgentRepo {
    pub async fn create(pool: &PgPool, input: &CreateAgent) -> Result<Agent, sqlx::Error> {
        let query = format!(
            "INSERT INTO agents (email, password_hash, display_name, avatar_url, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.display_name)
            .bind(&input.avatar_url)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE id = $1");
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Case-insensitive lookup used by login.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents WHERE LOWER(email) = LOWER($1)");
        sqlx::query_as::<_, Agent>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List agents alphabetically by display name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Agent>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM agents ORDER BY display_name ASC");
        sqlx::query_as::<_, Agent>(&query).fetch_all(pool).await
    }

    /// Update an agent. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAgent,
    ) -> Result<Option<Agent>, sqlx::Error> {
        let query = format!(
            "UPDATE agents SET
                display_name = COALESCE($2, display_name),
                avatar_url = COALESCE($3, avatar_url),
                role = COALESCE($4, role),
                status = COALESCE($5, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Agent>(&query)
            .bind(id)
            .bind(&input.display_name)
            .bind(&input.avatar_url)
            .bind(input.role.map(|r| r.as_str()))
            .bind(input.status.map(|s| s.as_str()))
            .fetch_optional(pool)
            .await
    }

    /// Record activity (login) for an agent.
    pub async fn touch_last_active(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE agents SET last_active_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Number of agents holding `role`.
    pub async fn count_by_role(pool: &PgPool, role: AgentRole) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*)::BIGINT FROM agents WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(pool)
            .await
    }
}
