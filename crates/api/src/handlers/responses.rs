//! Handlers for agent responses and internal notes on a post.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use modus_core::audit::{ACTION_CREATE_RESPONSE, ACTION_DELETE_RESPONSE, ACTION_UPDATE_RESPONSE};
use modus_core::security::{sanitize_response_content, validate_input_safety};
use modus_core::types::DbId;
use modus_db::models::audit::CreateAuditLog;
use modus_db::models::response::{CreateResponse, Response, UpdateResponse};
use modus_db::repositories::{AuditLogRepo, PostRepo, ResponseRepo};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Characters of content kept in the audit entry of a new response.
const CONTENT_PREVIEW_CHARS: usize = 100;

async fn ensure_post_exists(state: &AppState, post_id: DbId) -> AppResult<()> {
    PostRepo::find_by_id(&state.pool, post_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::not_found("Post", post_id))
}

/// Load a response of `post_id` that the caller wrote.
async fn load_own_response(
    state: &AppState,
    auth: &AuthUser,
    post_id: DbId,
    response_id: DbId,
) -> AppResult<Response> {
    let response = ResponseRepo::find_by_id(&state.pool, response_id)
        .await?
        .filter(|r| r.post_id == post_id)
        .ok_or_else(|| AppError::not_found("Response", response_id))?;
    if response.agent_id != auth.agent_id {
        return Err(AppError::forbidden(
            "Only the author may change this response",
        ));
    }
    Ok(response)
}

/// GET /api/v1/posts/{id}/responses
///
/// Responses and internal notes in chronological order.
pub async fn list_responses(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_post_exists(&state, post_id).await?;
    let responses = ResponseRepo::list_for_post(&state.pool, post_id).await?;
    Ok(Json(ListResponse::all(responses)))
}

/// POST /api/v1/posts/{id}/responses
pub async fn create_response(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<CreateResponse>,
) -> AppResult<impl IntoResponse> {
    validate_input_safety(&input.content)?;
    ensure_post_exists(&state, post_id).await?;

    let content = sanitize_response_content(&input.content);
    let mut tx = state.pool.begin().await?;
    let response = ResponseRepo::create(
        &mut *tx,
        post_id,
        auth.agent_id,
        &content,
        input.is_internal_note,
    )
    .await?;

    let preview: String = content.chars().take(CONTENT_PREVIEW_CHARS).collect();
    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_CREATE_RESPONSE)
            .post(post_id)
            .details(json!({
                "response_id": response.id,
                "is_internal_note": response.is_internal_note,
                "content_preview": preview,
            })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %post_id, response_id = %response.id, internal = response.is_internal_note, "Response created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// PATCH /api/v1/posts/{id}/responses/{response_id}
pub async fn update_response(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, response_id)): Path<(DbId, DbId)>,
    ValidatedJson(input): ValidatedJson<UpdateResponse>,
) -> AppResult<impl IntoResponse> {
    let existing = load_own_response(&state, &auth, post_id, response_id).await?;

    let content = match input.content.as_deref() {
        Some(raw) => {
            validate_input_safety(raw)?;
            Some(sanitize_response_content(raw))
        }
        None => None,
    };

    let mut tx = state.pool.begin().await?;
    let response = ResponseRepo::update(
        &mut *tx,
        response_id,
        content.as_deref(),
        input.is_internal_note,
    )
    .await?
    .ok_or_else(|| AppError::not_found("Response", response_id))?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_UPDATE_RESPONSE)
            .post(post_id)
            .details(json!({ "response_id": response_id }))
            .states(
                Some(json!({ "content": existing.content, "is_internal_note": existing.is_internal_note })),
                Some(json!({ "content": response.content, "is_internal_note": response.is_internal_note })),
            ),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %post_id, response_id = %response_id, "Response updated");

    Ok(Json(DataResponse { data: response }))
}

/// DELETE /api/v1/posts/{id}/responses/{response_id}
pub async fn delete_response(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((post_id, response_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let existing = load_own_response(&state, &auth, post_id, response_id).await?;

    let mut tx = state.pool.begin().await?;
    if !ResponseRepo::delete(&mut *tx, response_id).await? {
        return Err(AppError::not_found("Response", response_id));
    }

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_DELETE_RESPONSE)
            .post(post_id)
            .details(json!({ "response_id": response_id }))
            .states(
                Some(json!({ "content": existing.content, "is_internal_note": existing.is_internal_note })),
                None,
            ),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %post_id, response_id = %response_id, "Response deleted");

    Ok(StatusCode::NO_CONTENT)
}
