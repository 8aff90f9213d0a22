//! Repository for the `moderation_posts` table.

use modus_core::post::{PostStatus, Priority};
use modus_core::search::{PostSortField, SortOrder};
use modus_core::security::sanitize_input;
use modus_core::types::{DbId, Timestamp};
use sqlx::{PgExecutor, PgPool};

use crate::models::post::{ModerationPost, NewPost, PostQuery, QueueDepth};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, title, body_content, excerpt, category_id, status, priority, \
    sentiment_score, sentiment_label, author_user_id, author_post_count, \
    assigned_to_id, assigned_at, resolved_at, tags, embedding, created_at, updated_at";

/// Provides query, ingest and workflow operations for moderation posts.
pub struct PostRepo;

impl PostRepo {
    /// Insert a fully resolved post.
    pub async fn insert(pool: &PgPool, post: &NewPost) -> Result<ModerationPost, sqlx::Error> {
        let query = format!(
            "INSERT INTO moderation_posts
                (title, body_content, excerpt, category_id, status, priority,
                 sentiment_score, sentiment_label, author_user_id, author_post_count,
                 assigned_to_id, assigned_at, tags, embedding, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11,
                     CASE WHEN $11::UUID IS NULL THEN NULL ELSE NOW() END,
                     $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModerationPost>(&query)
            .bind(&post.title)
            .bind(&post.body_content)
            .bind(&post.excerpt)
            .bind(post.category_id)
            .bind(post.status.as_str())
            .bind(post.priority.as_str())
            .bind(post.sentiment_score)
            .bind(post.sentiment_label.as_str())
            .bind(post.author_user_id)
            .bind(post.author_post_count)
            .bind(post.assigned_to_id)
            .bind(&post.tags)
            .bind(&post.embedding)
            .bind(post.created_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ModerationPost>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM moderation_posts WHERE id = $1");
        sqlx::query_as::<_, ModerationPost>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List posts matching the filter, sorted and paginated.
    pub async fn list(pool: &PgPool, params: &PostQuery) -> Result<Vec<ModerationPost>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_post_filter(params);
        let order_by = order_clause(params.sort_by, params.sort_order);

        let query = format!(
            "SELECT {COLUMNS} FROM moderation_posts {where_clause} \
             ORDER BY {order_by} \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_post_values(sqlx::query_as::<_, ModerationPost>(&query), &bind_values);
        q.bind(params.limit).bind(params.offset).fetch_all(pool).await
    }

    /// Count posts matching the filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &PostQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_post_filter(params);

        let query =
            format!("SELECT COUNT(*)::BIGINT AS count FROM moderation_posts {where_clause}");

        let q = bind_post_values_scalar(sqlx::query_scalar::<_, i64>(&query), &bind_values);
        q.fetch_one(pool).await
    }

    /// Unresolved posts, and how many of those nobody holds.
    pub async fn queue_depth(pool: &PgPool) -> Result<QueueDepth, sqlx::Error> {
        sqlx::query_as::<_, QueueDepth>(
            "SELECT COUNT(*)::BIGINT AS unresolved,
                    COUNT(*) FILTER (WHERE assigned_to_id IS NULL)::BIGINT AS unassigned
             FROM moderation_posts
             WHERE status <> 'resolved'",
        )
        .fetch_one(pool)
        .await
    }

    /// Update workflow fields. `resolved_at` follows the status: it is set on
    /// entering `resolved` and cleared on leaving it.
    pub async fn update(
        executor: impl PgExecutor<'_>,
        id: DbId,
        status: Option<PostStatus>,
        priority: Option<Priority>,
        category_id: Option<DbId>,
    ) -> Result<Option<ModerationPost>, sqlx::Error> {
        let query = format!(
            "UPDATE moderation_posts SET
                status = COALESCE($2, status),
                priority = COALESCE($3, priority),
                category_id = COALESCE($4, category_id),
                resolved_at = CASE
                    WHEN $2 IS NULL THEN resolved_at
                    WHEN $2 = 'resolved' THEN COALESCE(resolved_at, NOW())
                    ELSE NULL
                END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModerationPost>(&query)
            .bind(id)
            .bind(status.map(|s| s.as_str()))
            .bind(priority.map(|p| p.as_str()))
            .bind(category_id)
            .fetch_optional(executor)
            .await
    }

    /// Assign a post to an agent and stamp `assigned_at`.
    pub async fn assign(
        executor: impl PgExecutor<'_>,
        id: DbId,
        agent_id: DbId,
    ) -> Result<Option<ModerationPost>, sqlx::Error> {
        let query = format!(
            "UPDATE moderation_posts SET assigned_to_id = $2, assigned_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModerationPost>(&query)
            .bind(id)
            .bind(agent_id)
            .fetch_optional(executor)
            .await
    }

    /// Clear the assignment of a post.
    pub async fn release(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Option<ModerationPost>, sqlx::Error> {
        let query = format!(
            "UPDATE moderation_posts SET assigned_to_id = NULL, assigned_at = NULL
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModerationPost>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built post queries.
enum BindValue {
    Uuid(DbId),
    Text(String),
    TextArray(Vec<String>),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from `PostQuery` filter parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`.
fn build_post_filter(params: &PostQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(category_id) = params.category_id {
        conditions.push(format!("category_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Uuid(category_id));
    }

    if let Some(status) = params.status {
        conditions.push(format!("status = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(status.as_str().to_string()));
    }

    if !params.priorities.is_empty() {
        conditions.push(format!("priority = ANY(${bind_idx})"));
        bind_idx += 1;
        bind_values.push(BindValue::TextArray(
            params
                .priorities
                .iter()
                .map(|p| p.as_str().to_string())
                .collect(),
        ));
    }

    if let Some(assigned_to_id) = params.assigned_to_id {
        conditions.push(format!("assigned_to_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Uuid(assigned_to_id));
    }

    if let Some(from) = params.date_from {
        conditions.push(format!("created_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.date_to {
        conditions.push(format!("created_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    if let Some(search) = params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        conditions.push(format!(
            "(title ILIKE ${bind_idx} OR body_content ILIKE ${bind_idx})"
        ));
        bind_idx += 1;
        // Titles and bodies are stored escaped, so the term must be too.
        let term = sanitize_input(search);
        bind_values.push(BindValue::Text(format!("%{}%", escape_like(&term))));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// `ORDER BY` expression for a sort key. Ties fall back to newest first.
fn order_clause(sort_by: PostSortField, order: SortOrder) -> String {
    let dir = order.as_sql();
    match sort_by {
        PostSortField::Priority => format!("priority {dir}, created_at DESC"),
        PostSortField::Date => format!("created_at {dir}"),
        PostSortField::Status => format!(
            "CASE status WHEN 'open' THEN 0 WHEN 'in_progress' THEN 1 ELSE 2 END {dir}, \
             created_at DESC"
        ),
    }
}

/// Escape `%`, `_` and `\` so user search text matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_post_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Uuid(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::TextArray(v) => q = q.bind(v.clone()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_post_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments>,
    bind_values: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, sqlx::Postgres, i64, sqlx::postgres::PgArguments> {
    for val in bind_values {
        match val {
            BindValue::Uuid(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::TextArray(v) => q = q.bind(v.clone()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
