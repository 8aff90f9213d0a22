//! Handler for the global audit log.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use modus_db::repositories::AuditLogRepo;

use crate::error::AppResult;
use crate::extract::ValidQuery;
use crate::middleware::rbac::RequireAdmin;
use crate::query::AuditListParams;
use crate::response::{ListResponse, OffsetMeta};
use crate::state::AppState;

/// GET /api/v1/audit
///
/// Filter by agent, post, action type and time range. Newest first.
pub async fn list_audit_logs(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ValidQuery(params): ValidQuery<AuditListParams>,
) -> AppResult<impl IntoResponse> {
    let query = params.resolve()?;

    let entries = AuditLogRepo::query(&state.pool, &query).await?;
    let total = AuditLogRepo::count(&state.pool, &query).await?;

    Ok(Json(ListResponse {
        data: entries,
        meta: OffsetMeta {
            total,
            limit: query.limit.unwrap_or_default(),
            offset: query.offset.unwrap_or_default(),
        },
    }))
}
