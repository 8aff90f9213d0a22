//! Handlers for the `/templates` resource (canned responses).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use modus_core::security::sanitize_template_content;
use modus_core::template::{extract_placeholders, missing_placeholders, render};
use modus_core::types::DbId;
use modus_db::models::template::{CreateTemplate, ResponseTemplate, UpdateTemplate, UseTemplate};
use modus_db::repositories::TemplateRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidQuery, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSupervisor;
use crate::query::CategoryFilterParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Response body of `POST /templates/{id}/use`.
#[derive(Debug, Serialize)]
pub struct RenderedTemplate {
    pub rendered: String,
    /// Placeholders left in `rendered` because no value was supplied.
    pub missing_placeholders: Vec<String>,
    pub template: ResponseTemplate,
}

/// GET /api/v1/templates
///
/// Most used first; `?category_id=` narrows to one category.
pub async fn list_templates(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<CategoryFilterParams>,
) -> AppResult<impl IntoResponse> {
    let templates = TemplateRepo::list(&state.pool, params.category_id).await?;
    Ok(Json(ListResponse::all(templates)))
}

/// GET /api/v1/templates/{id}
pub async fn get_template(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Template", id))?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /api/v1/templates
pub async fn create_template(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateTemplate>,
) -> AppResult<impl IntoResponse> {
    let content = sanitize_template_content(&input.content);
    let placeholders = input
        .placeholders
        .unwrap_or_else(|| extract_placeholders(&content));

    let template = TemplateRepo::create(
        &state.pool,
        input.name.trim(),
        &content,
        &placeholders,
        input.category_id,
        auth.agent_id,
    )
    .await?;

    tracing::info!(template_id = %template.id, created_by = %auth.agent_id, "Template created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// PATCH /api/v1/templates/{id}
///
/// New content without an explicit placeholder list re-derives the list.
pub async fn update_template(
    RequireSupervisor(user): RequireSupervisor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateTemplate>,
) -> AppResult<impl IntoResponse> {
    let content = input.content.as_deref().map(sanitize_template_content);
    let placeholders = match (&input.placeholders, &content) {
        (Some(explicit), _) => Some(explicit.clone()),
        (None, Some(content)) => Some(extract_placeholders(content)),
        (None, None) => None,
    };

    let template = TemplateRepo::update(
        &state.pool,
        id,
        input.name.as_deref().map(str::trim),
        content.as_deref(),
        placeholders.as_deref(),
        input.category_id,
    )
    .await?
    .ok_or_else(|| AppError::not_found("Template", id))?;

    tracing::info!(template_id = %id, updated_by = %user.agent_id, "Template updated");

    Ok(Json(DataResponse { data: template }))
}

/// DELETE /api/v1/templates/{id}
pub async fn delete_template(
    RequireSupervisor(user): RequireSupervisor,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Template", id));
    }

    tracing::info!(template_id = %id, deleted_by = %user.agent_id, "Template deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/templates/{id}/use
///
/// Render the template with the given values and count the use.
pub async fn use_template(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UseTemplate>,
) -> AppResult<impl IntoResponse> {
    let template = TemplateRepo::increment_usage(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Template", id))?;

    let rendered = render(&template.content, &input.values);
    let missing = missing_placeholders(&template.content, &input.values);

    Ok(Json(DataResponse {
        data: RenderedTemplate {
            rendered,
            missing_placeholders: missing,
            template,
        },
    }))
}
