//! One-off startup tasks run before the server accepts connections.

use modus_core::agent::AgentRole;
use modus_db::models::agent::{Agent, CreateAgent};
use modus_db::repositories::AgentRepo;
use modus_db::DbPool;

use crate::auth::password::hash_password;
use crate::config::SeedAdmin;
use crate::error::{AppError, AppResult};

/// Create the configured admin account unless an admin already exists.
///
/// Returns the new agent, or `None` when seeding was skipped.
pub async fn seed_admin(pool: &DbPool, seed: &SeedAdmin) -> AppResult<Option<Agent>> {
    if AgentRepo::count_by_role(pool, AgentRole::Admin).await? > 0 {
        return Ok(None);
    }

    let password_hash = hash_password(&seed.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let agent = AgentRepo::create(
        pool,
        &CreateAgent {
            email: seed.email.trim().to_lowercase(),
            password_hash,
            display_name: seed.display_name.clone(),
            avatar_url: None,
            role: AgentRole::Admin,
        },
    )
    .await?;

    tracing::info!(agent_id = %agent.id, email = %agent.email, "Seeded admin account");
    Ok(Some(agent))
}
