//! Listing helpers: pagination, sort keys and date-range parsing.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Default page size for post listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Maximum page size for any listing.
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Default page size for the audit log.
pub const DEFAULT_AUDIT_LIMIT: i64 = 100;

string_enum! {
    /// Sort key of the post queue.
    pub enum PostSortField {
        Priority => "priority",
        Date => "date",
        Status => "status",
    }
}

string_enum! {
    pub enum SortOrder {
        Asc => "asc",
        Desc => "desc",
    }
}

impl SortOrder {
    /// SQL keyword for an `ORDER BY` clause.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Clamp a client-supplied limit into `1..=max`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a client-supplied offset to be non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// Normalise a 1-based page number.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Row offset of `page` for a given page size.
pub fn page_offset(page: i64, limit: i64) -> i64 {
    (page - 1).saturating_mul(limit)
}

/// Pagination block returned next to a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            total,
            page,
            limit,
            pages,
        }
    }
}

/// Parse a date-range bound given as RFC 3339 or a bare `YYYY-MM-DD`.
///
/// A bare date is the start of that day for a lower bound and the last
/// instant of that day for an upper bound, so `date_to=2025-01-17` includes
/// posts created on the 17th.
pub fn parse_date_bound(value: &str, upper: bool) -> Result<Timestamp, CoreError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        CoreError::Validation(format!(
            "Invalid date '{value}'. Expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })?;
    let time = if upper {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| CoreError::Internal("invalid time of day".to_string()))?;
    Ok(date.and_time(time).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
    }

    #[test]
    fn offset_and_page_are_non_negative() {
        assert_eq!(clamp_offset(Some(-3)), 0);
        assert_eq!(clamp_page(Some(0)), 1);
        assert_eq!(page_offset(3, 20), 40);
    }

    #[test]
    fn meta_rounds_pages_up() {
        assert_eq!(PageMeta::new(41, 1, 20).pages, 3);
        assert_eq!(PageMeta::new(40, 1, 20).pages, 2);
        assert_eq!(PageMeta::new(0, 1, 20).pages, 0);
    }

    #[test]
    fn parses_rfc3339_bound() {
        let ts = parse_date_bound("2025-01-17T10:00:00+02:00", false).unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2025, 1, 17, 8, 0, 0).unwrap());
    }

    #[test]
    fn bare_date_covers_whole_day() {
        let from = parse_date_bound("2025-01-17", false).unwrap();
        let to = parse_date_bound("2025-01-17", true).unwrap();
        assert_eq!(from, Utc.with_ymd_and_hms(2025, 1, 17, 0, 0, 0).unwrap());
        assert!(to > Utc.with_ymd_and_hms(2025, 1, 17, 23, 59, 59).unwrap());
        assert!(to < Utc.with_ymd_and_hms(2025, 1, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_matches!(
            parse_date_bound("yesterday", false),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn sort_order_sql() {
        assert_eq!("desc".parse::<SortOrder>().unwrap().as_sql(), "DESC");
        assert_eq!(PostSortField::Priority.as_str(), "priority");
    }
}
