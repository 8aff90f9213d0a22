//! Handlers for the `/auth` resource (login, session).

use axum::extract::State;
use axum::Json;
use modus_core::agent::{AgentRole, AgentStatus};
use modus_core::error::CoreError;
use modus_core::types::{DbId, Timestamp};
use modus_db::models::agent::Agent;
use modus_db::repositories::AgentRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub agent: Agent,
}

/// Session of the caller, as returned by `GET /auth/session`.
#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub agent_id: DbId,
    pub email: String,
    pub display_name: String,
    pub role: AgentRole,
    pub status: AgentStatus,
    pub expires_at: Timestamp,
}

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".into(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns a bearer access token.
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let agent = AgentRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let password_valid = verify_password(&input.password, &agent.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(agent_id = %agent.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    AgentRepo::touch_last_active(&state.pool, agent.id).await?;

    let access_token = generate_access_token(agent.id, agent.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    tracing::info!(agent_id = %agent.id, role = %agent.role, "Agent logged in");

    Ok(Json(DataResponse {
        data: AuthResponse {
            access_token,
            token_type: "Bearer",
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            agent,
        },
    }))
}

/// GET /api/v1/auth/session
///
/// Session info of the caller. Fails with 401 if the agent no longer exists.
pub async fn session(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SessionInfo>>> {
    let agent = AgentRepo::find_by_id(&state.pool, auth.agent_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("No active session".into())))?;

    Ok(Json(DataResponse {
        data: SessionInfo {
            agent_id: agent.id,
            email: agent.email,
            display_name: agent.display_name,
            // The stored role wins over the one baked into the token.
            role: agent.role,
            status: agent.status,
            expires_at: auth.expires_at,
        },
    }))
}
