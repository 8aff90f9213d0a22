//! Handlers for the `/rules` resource (priority rules).
//!
//! Any agent may read the rule list; authoring, reordering and the rule
//! tester are admin only. Every write leaves an audit entry.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use modus_core::audit::{
    ACTION_CREATE_RULE, ACTION_DELETE_RULE, ACTION_REORDER_RULES, ACTION_UPDATE_RULE,
};
use modus_core::post::PostStatus;
use modus_core::rules::{reorder_positions, test_rules, validate_rule_values, RuleSubject};
use modus_core::types::DbId;
use modus_db::models::audit::CreateAuditLog;
use modus_db::models::rule::{
    to_engine_rules, CreatePriorityRule, ReorderRules, RuleTestRequest, UpdatePriorityRule,
};
use modus_db::repositories::{AuditLogRepo, PriorityRuleRepo};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// GET /api/v1/rules
///
/// All rules in evaluation order with `meta.total`.
pub async fn list_rules(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rules = PriorityRuleRepo::list(&state.pool).await?;
    Ok(Json(ListResponse::all(rules)))
}

/// GET /api/v1/rules/{id}
pub async fn get_rule(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let rule = PriorityRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PriorityRule", id))?;
    Ok(Json(DataResponse { data: rule }))
}

/// POST /api/v1/rules
///
/// Create a rule at the end of the evaluation order.
pub async fn create_rule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePriorityRule>,
) -> AppResult<impl IntoResponse> {
    validate_rule_values(
        input.condition_type,
        &input.condition_value,
        input.action_type,
        &input.action_value,
    )?;

    let mut tx = state.pool.begin().await?;
    let rule = PriorityRuleRepo::create(&mut *tx, &input).await?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(admin.agent_id, ACTION_CREATE_RULE)
            .details(json!({ "rule_id": rule.id, "name": rule.name }))
            .states(None, serde_json::to_value(&rule).ok()),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(rule_id = %rule.id, position = rule.position, "Rule created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: rule })))
}

/// PATCH /api/v1/rules/{id}
///
/// Partial update. The resulting condition/action combination is checked
/// as a whole, so changing only the type re-validates the stored value.
pub async fn update_rule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePriorityRule>,
) -> AppResult<impl IntoResponse> {
    let existing = PriorityRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PriorityRule", id))?;

    validate_rule_values(
        input.condition_type.unwrap_or(existing.condition_type),
        input
            .condition_value
            .as_deref()
            .unwrap_or(&existing.condition_value),
        input.action_type.unwrap_or(existing.action_type),
        input.action_value.as_deref().unwrap_or(&existing.action_value),
    )?;

    let mut tx = state.pool.begin().await?;
    let rule = PriorityRuleRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("PriorityRule", id))?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(admin.agent_id, ACTION_UPDATE_RULE)
            .details(json!({ "rule_id": rule.id }))
            .states(
                serde_json::to_value(&existing).ok(),
                serde_json::to_value(&rule).ok(),
            ),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(rule_id = %id, "Rule updated");

    Ok(Json(DataResponse { data: rule }))
}

/// DELETE /api/v1/rules/{id}
pub async fn delete_rule(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let existing = PriorityRuleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("PriorityRule", id))?;

    let mut tx = state.pool.begin().await?;
    if !PriorityRuleRepo::delete(&mut *tx, id).await? {
        return Err(AppError::not_found("PriorityRule", id));
    }

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(admin.agent_id, ACTION_DELETE_RULE)
            .details(json!({ "rule_id": id, "name": existing.name }))
            .states(serde_json::to_value(&existing).ok(), None),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(rule_id = %id, "Rule deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/rules/reorder
///
/// Body `{ "rule_ids": [...] }`: the rule at index `i` gets position `i + 1`.
/// Returns the complete rule list in its new order.
pub async fn reorder_rules(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<ReorderRules>,
) -> AppResult<impl IntoResponse> {
    let positions = reorder_positions(&input.rule_ids)?;
    let mut tx = state.pool.begin().await?;
    let rules = PriorityRuleRepo::reorder(&mut tx, &positions).await?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(admin.agent_id, ACTION_REORDER_RULES)
            .details(json!({ "rule_ids": input.rule_ids })),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(count = positions.len(), "Rules reordered");

    Ok(Json(ListResponse::all(rules)))
}

/// POST /api/v1/rules/test
///
/// Evaluate a sample post against the active rules (or a single rule when
/// `rule_id` is given) without persisting anything.
pub async fn test_rule_set(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<RuleTestRequest>,
) -> AppResult<impl IntoResponse> {
    let rows = match input.rule_id {
        Some(rule_id) => vec![PriorityRuleRepo::find_by_id(&state.pool, rule_id)
            .await?
            .ok_or_else(|| AppError::not_found("PriorityRule", rule_id))?],
        None => PriorityRuleRepo::list(&state.pool).await?,
    };

    let now = Utc::now();
    let subject = RuleSubject {
        title: &input.title,
        body_content: &input.body_content,
        author_post_count: input.author_post_count,
        sentiment_score: input.sentiment_score,
        category_id: input.category_id,
        status: input.status.unwrap_or(PostStatus::Open),
        created_at: input.created_at.unwrap_or(now),
    };

    let result = test_rules(to_engine_rules(&rows), &subject, now);

    Ok(Json(DataResponse { data: result }))
}
