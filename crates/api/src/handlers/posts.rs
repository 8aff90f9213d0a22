//! Handlers for the `/posts` resource: the moderation queue.
//!
//! Ingest runs every post through safety check, sanitization, sentiment
//! analysis and the priority rules before it is stored. Workflow changes
//! (status, priority, assignment) are audited.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use modus_core::audit::{ACTION_ASSIGN_POST, ACTION_RELEASE_POST, ACTION_UPDATE_POST};
use modus_core::error::CoreError;
use modus_core::post::{make_excerpt, PostStatus, SentimentLabel};
use modus_core::rules::{RuleSubject, RulesEngine};
use modus_core::search::PageMeta;
use modus_core::security::{sanitize_post_content, validate_input_safety};
use modus_core::sentiment::analyze_sentiment;
use modus_core::types::DbId;
use modus_db::models::audit::CreateAuditLog;
use modus_db::models::post::{CreatePost, ModerationPost, NewPost, UpdatePost};
use modus_db::models::rule::to_engine_rules;
use modus_db::repositories::{AgentRepo, AuditLogRepo, PostRepo, PriorityRuleRepo};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::extract::{ValidQuery, ValidatedJson};
use crate::middleware::auth::AuthUser;
use crate::query::PostListParams;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

/// Request body for `POST /posts/{id}/assign`.
///
/// Without `agent_id` the caller claims the post for themselves.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct AssignPost {
    #[serde(default)]
    pub agent_id: Option<DbId>,
}

async fn load_post(state: &AppState, id: DbId) -> AppResult<ModerationPost> {
    PostRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))
}

/// The workflow fields captured in audit snapshots.
fn workflow_state(post: &ModerationPost) -> serde_json::Value {
    json!({
        "status": post.status,
        "priority": post.priority,
        "category_id": post.category_id,
        "assigned_to_id": post.assigned_to_id,
    })
}

/// GET /api/v1/posts
///
/// Filtered, sorted, paginated queue. Defaults to most urgent first.
pub async fn list_posts(
    _auth: AuthUser,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<PostListParams>,
) -> AppResult<impl IntoResponse> {
    let (query, page) = params.resolve()?;

    let posts = PostRepo::list(&state.pool, &query).await?;
    let total = PostRepo::count(&state.pool, &query).await?;

    Ok(Json(ListResponse::page(
        posts,
        PageMeta::new(total, page, query.limit),
    )))
}

/// POST /api/v1/posts
///
/// Ingest a post. Rules see the raw text; the stored fields are escaped.
pub async fn create_post(
    auth: AuthUser,
    State(state): State<AppState>,
    ValidatedJson(input): ValidatedJson<CreatePost>,
) -> AppResult<impl IntoResponse> {
    validate_input_safety(&input.title)?;
    validate_input_safety(&input.body_content)?;

    let (sentiment_score, sentiment_label) = match input.sentiment_score {
        Some(score) => (
            score,
            input
                .sentiment_label
                .unwrap_or_else(|| SentimentLabel::from_score(score)),
        ),
        None => {
            let analysis = analyze_sentiment(&format!("{} {}", input.title, input.body_content));
            (analysis.score, analysis.label)
        }
    };

    let now = Utc::now();
    let status = input.status.unwrap_or(PostStatus::Open);
    let created_at = input.created_at.unwrap_or(now);
    let author_post_count = input.author_post_count.unwrap_or(0);

    let rules = PriorityRuleRepo::list(&state.pool).await?;
    let engine = RulesEngine::new(to_engine_rules(&rules));
    let outcome = engine.outcome(
        &RuleSubject {
            title: &input.title,
            body_content: &input.body_content,
            author_post_count,
            sentiment_score: Some(sentiment_score),
            category_id: input.category_id,
            status,
            created_at,
        },
        now,
    );

    // An auto_assign rule may name an agent that has since been removed.
    let rule_assignee = match outcome.assign_to {
        Some(agent_id) => AgentRepo::find_by_id(&state.pool, agent_id)
            .await?
            .map(|agent| agent.id),
        None => None,
    };

    let excerpt = input
        .excerpt
        .clone()
        .unwrap_or_else(|| make_excerpt(&input.body_content));
    let content = sanitize_post_content(&input.title, &input.body_content, Some(&excerpt));

    let post = PostRepo::insert(
        &state.pool,
        &NewPost {
            title: content.title,
            body_content: content.body_content,
            excerpt: content.excerpt,
            category_id: input.category_id,
            status,
            priority: outcome.priority,
            sentiment_score,
            sentiment_label,
            author_user_id: input.author_user_id,
            author_post_count,
            assigned_to_id: input.assigned_to_id.or(rule_assignee),
            tags: outcome.tags,
            embedding: input.embedding,
            created_at,
        },
    )
    .await?;

    tracing::info!(
        post_id = %post.id,
        priority = %post.priority,
        matched_rules = outcome.matched_rules.len(),
        ingested_by = %auth.agent_id,
        "Post ingested"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: post })))
}

/// GET /api/v1/posts/{id}
pub async fn get_post(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let post = load_post(&state, id).await?;
    Ok(Json(DataResponse { data: post }))
}

/// PATCH /api/v1/posts/{id}
///
/// Change status, priority or category. Moving into `resolved` stamps
/// `resolved_at`; moving out of it clears the stamp.
pub async fn update_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<UpdatePost>,
) -> AppResult<impl IntoResponse> {
    if input.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one of status, priority or category_id is required".into(),
        )));
    }

    let existing = load_post(&state, id).await?;

    let mut tx = state.pool.begin().await?;
    let post = PostRepo::update(
        &mut *tx,
        id,
        input.status,
        input.priority,
        input.category_id,
    )
    .await?
    .ok_or_else(|| AppError::not_found("Post", id))?;

    let mut changed_fields = Vec::new();
    if existing.status != post.status {
        changed_fields.push("status");
    }
    if existing.priority != post.priority {
        changed_fields.push("priority");
    }
    if existing.category_id != post.category_id {
        changed_fields.push("category_id");
    }

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_UPDATE_POST)
            .post(id)
            .details(json!({ "changed_fields": changed_fields }))
            .states(Some(workflow_state(&existing)), Some(workflow_state(&post))),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %id, agent_id = %auth.agent_id, status = %post.status, priority = %post.priority, "Post updated");

    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/posts/{id}/assign
///
/// Claim a post, or assign it to `agent_id`. Assigning to someone else, or
/// taking a post another agent holds, needs supervisor rights.
pub async fn assign_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    ValidatedJson(input): ValidatedJson<AssignPost>,
) -> AppResult<impl IntoResponse> {
    let target = input.agent_id.unwrap_or(auth.agent_id);
    if target != auth.agent_id && !auth.role.can_reassign() {
        return Err(AppError::forbidden(
            "Supervisor or Admin role required to assign other agents",
        ));
    }

    let existing = load_post(&state, id).await?;
    if let Some(holder) = existing.assigned_to_id {
        if holder != target && holder != auth.agent_id && !auth.role.can_reassign() {
            return Err(AppError::Core(CoreError::Conflict(
                "Post is already assigned to another agent".into(),
            )));
        }
    }

    if AgentRepo::find_by_id(&state.pool, target).await?.is_none() {
        return Err(AppError::not_found("Agent", target));
    }

    let mut tx = state.pool.begin().await?;
    let post = PostRepo::assign(&mut *tx, id, target)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))?;

    let reason = if target == auth.agent_id {
        "agent_claimed"
    } else {
        "agent_assigned"
    };
    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_ASSIGN_POST)
            .post(id)
            .details(json!({ "reason": reason, "assigned_to_id": target }))
            .states(Some(workflow_state(&existing)), Some(workflow_state(&post))),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %id, assigned_to = %target, agent_id = %auth.agent_id, "Post assigned");

    Ok(Json(DataResponse { data: post }))
}

/// POST /api/v1/posts/{id}/release
///
/// Give a post back to the queue. Only the assignee or a supervisor may.
pub async fn release_post(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let existing = load_post(&state, id).await?;
    if let Some(holder) = existing.assigned_to_id {
        if holder != auth.agent_id && !auth.role.can_reassign() {
            return Err(AppError::forbidden(
                "Only the assigned agent may release this post",
            ));
        }
    }

    let mut tx = state.pool.begin().await?;
    let post = PostRepo::release(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Post", id))?;

    AuditLogRepo::create(
        &mut *tx,
        &CreateAuditLog::new(auth.agent_id, ACTION_RELEASE_POST)
            .post(id)
            .details(json!({ "reason": "agent_released" }))
            .states(Some(workflow_state(&existing)), Some(workflow_state(&post))),
    )
    .await?;
    tx.commit().await?;

    tracing::info!(post_id = %id, agent_id = %auth.agent_id, "Post released");

    Ok(Json(DataResponse { data: post }))
}

/// GET /api/v1/posts/{id}/audit
///
/// Audit trail of one post, newest first.
pub async fn post_audit_trail(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    load_post(&state, id).await?;
    let entries = AuditLogRepo::list_for_post(&state.pool, id).await?;
    Ok(Json(ListResponse::all(entries)))
}
