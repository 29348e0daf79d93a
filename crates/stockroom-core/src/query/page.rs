//! # Pagination Calculator
//!
//! `offset = limit * page - limit`, so page 1 always starts at row 0.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Page used when the request names none.
pub const DEFAULT_PAGE: u32 = 1;

/// Rows per page when the request names no limit.
pub const DEFAULT_LIMIT: u32 = 10;

/// A validated (page, limit) pair. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Creates a page request.
    ///
    /// ## Errors
    /// `page < 1` or `limit < 1` is rejected rather than clamped: a
    /// negative offset has no meaning and silently serving page 1 would
    /// hide a client bug.
    ///
    /// ## Example
    /// ```rust
    /// use stockroom_core::query::PageRequest;
    ///
    /// assert_eq!(PageRequest::new(3, 4).unwrap().offset(), 8);
    /// assert!(PageRequest::new(0, 10).is_err());
    /// ```
    pub fn new(page: i64, limit: i64) -> CoreResult<Self> {
        let page = u32::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| invalid("page", page))?;
        let limit = u32::try_from(limit)
            .ok()
            .filter(|l| *l >= 1)
            .ok_or_else(|| invalid("limit", limit))?;
        Ok(PageRequest { page, limit })
    }

    /// Parses the raw `page` / `limit` query values, defaulting absent ones.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> CoreResult<Self> {
        let page = parse_number("page", page, DEFAULT_PAGE)?;
        let limit = parse_number("limit", limit, DEFAULT_LIMIT)?;
        PageRequest::new(page, limit)
    }

    #[inline]
    pub fn page(&self) -> u32 {
        self.page
    }

    #[inline]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Rows to skip before this page.
    #[inline]
    pub fn offset(&self) -> u64 {
        u64::from(self.limit) * u64::from(self.page) - u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn invalid(field: &str, value: impl ToString) -> CoreError {
    CoreError::InvalidPage {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn parse_number(field: &str, raw: Option<&str>, default: u32) -> CoreResult<i64> {
    match raw {
        None => Ok(i64::from(default)),
        Some(raw) => raw.trim().parse().map_err(|_| invalid(field, raw)),
    }
}

/// One page of results plus the total row count behind the filter.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Page {
            items,
            page: request.page(),
            limit: request.limit(),
            total,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(u64::from(self.limit.max(1)))
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(PageRequest::new(1, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(2, 10).unwrap().offset(), 10);
        assert_eq!(PageRequest::new(3, 4).unwrap().offset(), 8);
    }

    #[test]
    fn test_rejects_below_one() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(CoreError::InvalidPage { ref field, .. }) if field == "page"
        ));
        assert!(PageRequest::new(-1, 10).is_err());
        assert!(matches!(
            PageRequest::new(1, 0),
            Err(CoreError::InvalidPage { ref field, .. }) if field == "limit"
        ));
    }

    #[test]
    fn test_parse_defaults() {
        let page = PageRequest::parse(None, None).unwrap();
        assert_eq!(page, PageRequest::default());
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), 10);

        let page = PageRequest::parse(Some("4"), Some("25")).unwrap();
        assert_eq!(page.offset(), 75);

        assert!(PageRequest::parse(Some("two"), None).is_err());
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let page = PageRequest::new(i64::from(u32::MAX), i64::from(u32::MAX)).unwrap();
        assert_eq!(page.offset(), u64::from(u32::MAX) * u64::from(u32::MAX - 1));
    }

    #[test]
    fn test_page_totals() {
        let page = Page::new(vec![1, 2, 3], PageRequest::new(1, 3).unwrap(), 7);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last = Page::new(vec![7], PageRequest::new(3, 3).unwrap(), 7);
        assert!(!last.has_next());
    }
}
