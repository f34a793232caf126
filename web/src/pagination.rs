//! Wire form of cursor pagination.
//!
//! Cursors travel as an opaque `<rfc3339>~<uuid>` string so clients can
//! hand them back verbatim. A cursor that fails to parse is a client
//! error, not a silent restart from the first page.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use janseva_core::store::{Page, PageCursor, PageRequest};
use serde::Serialize;
use uuid::Uuid;

/// Largest page a client may request.
pub const MAX_LIMIT: usize = 100;

/// Builds a [`PageRequest`] from the raw query parameters.
///
/// The limit defaults to [`PageRequest::DEFAULT_LIMIT`] and is clamped
/// to `1..=MAX_LIMIT`.
///
/// # Errors
///
/// `AppError` (400) when the cursor string is malformed.
pub fn parse_page(limit: Option<usize>, cursor: Option<&str>) -> Result<PageRequest, AppError> {
    let limit = limit
        .unwrap_or(PageRequest::DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    let cursor = cursor.map(parse_cursor).transpose()?;
    Ok(PageRequest { limit, cursor })
}

fn parse_cursor(raw: &str) -> Result<PageCursor, AppError> {
    let malformed = || AppError::bad_request(format!("malformed cursor: {raw}"));
    let (created_at, id) = raw.split_once('~').ok_or_else(malformed)?;
    let created_at = DateTime::parse_from_rfc3339(created_at)
        .map_err(|_| malformed())?
        .with_timezone(&Utc);
    let id = Uuid::parse_str(id).map_err(|_| malformed())?;
    Ok(PageCursor { created_at, id })
}

fn format_cursor(cursor: PageCursor) -> String {
    format!("{}~{}", cursor.created_at.to_rfc3339(), cursor.id)
}

/// One page of results as returned on the wire.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    /// The items on this page, newest first.
    pub items: Vec<T>,
    /// Opaque cursor for the next page, absent when exhausted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            next_cursor: page.next_cursor.map(format_cursor),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_clamping() {
        let page = parse_page(None, None).unwrap();
        assert_eq!(page.limit, PageRequest::DEFAULT_LIMIT);
        assert!(page.cursor.is_none());

        assert_eq!(parse_page(Some(0), None).unwrap().limit, 1);
        assert_eq!(parse_page(Some(10_000), None).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn cursor_round_trips() {
        let cursor = PageCursor {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let raw = format_cursor(cursor);
        let page = parse_page(None, Some(&raw)).unwrap();
        assert_eq!(page.cursor, Some(cursor));
    }

    #[test]
    fn malformed_cursors_are_rejected() {
        for raw in ["nonsense", "2024-01-01T00:00:00Z", "~", "not-a-date~not-a-uuid"] {
            let err = parse_page(None, Some(raw)).unwrap_err();
            assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
        }
    }
}
