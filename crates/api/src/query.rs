//! Shared query parameter types for API handlers.
//!
//! Raw query strings are deserialized here and resolved into the typed
//! filters the repositories take.

use modus_core::audit::is_known_action;
use modus_core::error::CoreError;
use modus_core::post::{PostStatus, Priority};
use modus_core::search::{
    clamp_limit, clamp_offset, clamp_page, page_offset, parse_date_bound, PostSortField,
    SortOrder, DEFAULT_AUDIT_LIMIT, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
use modus_core::types::DbId;
use modus_db::models::audit::AuditQuery;
use modus_db::models::post::PostQuery;
use serde::Deserialize;

/// Query parameters for list endpoints that support an `include_inactive` flag.
#[derive(Debug, Deserialize)]
pub struct IncludeInactiveParams {
    #[serde(default)]
    pub include_inactive: bool,
}

/// Optional category filter (`?category_id=`).
#[derive(Debug, Deserialize)]
pub struct CategoryFilterParams {
    pub category_id: Option<DbId>,
}

/// Query parameters of `GET /posts`.
///
/// `priority` is a comma-separated list (`?priority=P1,P2`). Date bounds
/// accept RFC 3339 timestamps or plain `YYYY-MM-DD` dates; a plain
/// `date_to` covers the whole day.
#[derive(Debug, Default, Deserialize)]
pub struct PostListParams {
    pub category_id: Option<DbId>,
    pub status: Option<PostStatus>,
    pub priority: Option<String>,
    pub assigned_to_id: Option<DbId>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<PostSortField>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PostListParams {
    /// Resolve into a repository filter plus the effective page number.
    pub fn resolve(self) -> Result<(PostQuery, i64), CoreError> {
        let priorities = match self.priority.as_deref() {
            Some(raw) => parse_priorities(raw)?,
            None => Vec::new(),
        };
        let date_from = self
            .date_from
            .as_deref()
            .map(|v| parse_date_bound(v, false))
            .transpose()?;
        let date_to = self
            .date_to
            .as_deref()
            .map(|v| parse_date_bound(v, true))
            .transpose()?;
        if let (Some(from), Some(to)) = (date_from, date_to) {
            if from > to {
                return Err(CoreError::Validation(
                    "date_from: must not be after date_to".into(),
                ));
            }
        }

        let page = clamp_page(self.page);
        let limit = clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);

        let query = PostQuery {
            category_id: self.category_id,
            status: self.status,
            priorities,
            assigned_to_id: self.assigned_to_id,
            date_from,
            date_to,
            search: self.search,
            sort_by: self.sort_by.unwrap_or(PostSortField::Priority),
            sort_order: self.sort_order.unwrap_or(SortOrder::Asc),
            limit,
            offset: page_offset(page, limit),
        };
        Ok((query, page))
    }
}

/// Parse `P1,P2` into priorities, ignoring empty segments.
fn parse_priorities(raw: &str) -> Result<Vec<Priority>, CoreError> {
    let mut out = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let priority: Priority = part.parse()?;
        if !out.contains(&priority) {
            out.push(priority);
        }
    }
    Ok(out)
}

/// Query parameters of `GET /audit`.
#[derive(Debug, Default, Deserialize)]
pub struct AuditListParams {
    pub agent_id: Option<DbId>,
    pub post_id: Option<DbId>,
    pub action_type: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl AuditListParams {
    pub fn resolve(self) -> Result<AuditQuery, CoreError> {
        let action_type = self.action_type.filter(|a| !a.is_empty());
        if let Some(action) = action_type.as_deref() {
            if !is_known_action(action) {
                return Err(CoreError::Validation(format!(
                    "action_type: unknown action '{action}'"
                )));
            }
        }

        Ok(AuditQuery {
            agent_id: self.agent_id,
            post_id: self.post_id,
            action_type,
            from: self
                .from
                .as_deref()
                .map(|v| parse_date_bound(v, false))
                .transpose()?,
            to: self
                .to
                .as_deref()
                .map(|v| parse_date_bound(v, true))
                .transpose()?,
            limit: Some(clamp_limit(self.limit, DEFAULT_AUDIT_LIMIT, MAX_PAGE_LIMIT)),
            offset: Some(clamp_offset(self.offset)),
        })
    }
}
