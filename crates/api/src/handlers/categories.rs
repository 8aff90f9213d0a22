//! Handlers for the `/categories` resource.
//!
//! Reading is open to every agent; writes are admin only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use modus_core::rules::reorder_positions;
use modus_core::types::DbId;
use modus_db::models::category::{CreateCategory, ReorderCategories, UpdateCategory};
use modus_db::repositories::CategoryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidQuery, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::IncludeInactiveParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/categories
///
/// Active categories in display order; `?include_inactive=true` lists all.
pub async fn list_categories(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<IncludeInactiveParams>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list(&state.pool, params.include_inactive).await?;
    Ok(Json(ListResponse::all(categories)))
}

/// GET /api/v1/categories/{id}
pub async fn get_category(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Category", id))?;
    Ok(Json(DataResponse { data: category }))
}

/// POST /api/v1/categories
pub async fn create_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreateCategory>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::create(&state.pool, &input).await?;

    tracing::info!(category_id = %category.id, slug = %category.slug, admin_id = %admin.agent_id, "Category created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PATCH /api/v1/categories/{id}
pub async fn update_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdateCategory>,
) -> AppResult<impl IntoResponse> {
    let category = CategoryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    tracing::info!(category_id = %id, admin_id = %admin.agent_id, "Category updated");

    Ok(Json(DataResponse { data: category }))
}

/// DELETE /api/v1/categories/{id}
///
/// Posts and templates in the category become uncategorised.
pub async fn delete_category(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Category", id));
    }

    tracing::info!(category_id = %id, admin_id = %admin.agent_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/categories/reorder
pub async fn reorder_categories(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ReorderCategories>,
) -> AppResult<impl IntoResponse> {
    let positions = reorder_positions(&input.category_ids)?;
    let categories = CategoryRepo::reorder(&state.pool, &positions).await?;

    tracing::info!(count = positions.len(), "Categories reordered");

    Ok(Json(ListResponse::all(categories)))
}
