//! Handlers for the `/agents` resource.
//!
//! Every agent may read the roster and change their own availability.
//! Admins create accounts and edit profiles and roles.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use modus_core::agent::AgentRole;
use modus_core::error::CoreError;
use modus_core::schema::validate_not_blank;
use modus_core::types::DbId;
use modus_db::models::agent::{CreateAgent, UpdateAgent};
use modus_db::repositories::AgentRepo;
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Request body for `POST /agents`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgentRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub display_name: String,
    #[validate(url)]
    pub avatar_url: Option<String>,
    pub role: Option<AgentRole>,
}

/// GET /api/v1/agents
pub async fn list_agents(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let agents = AgentRepo::list(&state.pool).await?;
    Ok(Json(ListResponse::all(agents)))
}

/// GET /api/v1/agents/{id}
pub async fn get_agent(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let agent = AgentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Agent", id))?;
    Ok(Json(DataResponse { data: agent }))
}

/// POST /api/v1/agents
///
/// Create an agent account. Admin only.
pub async fn create_agent(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateAgentRequest>,
) -> AppResult<impl IntoResponse> {
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(format!("password: {msg}"))))?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let agent = AgentRepo::create(
        &state.pool,
        &CreateAgent {
            email: input.email.trim().to_lowercase(),
            password_hash,
            display_name: input.display_name.trim().to_string(),
            avatar_url: input.avatar_url,
            role: input.role.unwrap_or(AgentRole::Agent),
        },
    )
    .await?;

    tracing::info!(agent_id = %agent.id, admin_id = %admin.agent_id, role = %agent.role, "Agent created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: agent })))
}

/// PATCH /api/v1/agents/{id}
///
/// Admins may change any field of any agent. Other agents may only change
/// their own `status`. A status change also refreshes `last_active_at`.
pub async fn update_agent(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateAgent>,
) -> AppResult<impl IntoResponse> {
    if !auth.role.is_admin() {
        if id != auth.agent_id {
            return Err(AppError::forbidden("Agents may only update themselves"));
        }
        if input.changes_profile() {
            return Err(AppError::forbidden("Only status may be changed"));
        }
    }

    if input.status.is_some() {
        AgentRepo::touch_last_active(&state.pool, id).await?;
    }

    let agent = AgentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Agent", id))?;

    tracing::info!(agent_id = %id, updated_by = %auth.agent_id, status = %agent.status, "Agent updated");

    Ok(Json(DataResponse { data: agent }))
}
