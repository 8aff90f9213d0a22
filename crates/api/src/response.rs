//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope. Listings add a
//! `meta` block with totals and pagination.

use modus_core::search::PageMeta;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "data": [...], "meta": M }` envelope for listings.
#[derive(Debug, Serialize)]
pub struct ListResponse<T: Serialize, M: Serialize> {
    pub data: Vec<T>,
    pub meta: M,
}

/// Meta block for unpaginated listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TotalMeta {
    pub total: i64,
}

impl<T: Serialize> ListResponse<T, TotalMeta> {
    /// Wrap a full listing, reporting its length as the total.
    pub fn all(data: Vec<T>) -> Self {
        let total = data.len() as i64;
        Self {
            data,
            meta: TotalMeta { total },
        }
    }
}

impl<T: Serialize> ListResponse<T, PageMeta> {
    pub fn page(data: Vec<T>, meta: PageMeta) -> Self {
        Self { data, meta }
    }
}

/// Meta block for offset-paginated listings.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OffsetMeta {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
