use serde::Serialize;

use crate::config::ITEMS_PER_PAGE;
use crate::error::{AppError, AppResult};

/// A 1-indexed page request translated into SQL `LIMIT`/`OFFSET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: Option<i64>) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::invalid("page must be at least 1"));
        }
        if ITEMS_PER_PAGE.checked_mul(page - 1).is_none() {
            return Err(AppError::invalid("page is out of range"));
        }
        Ok(Self {
            page,
            page_size: ITEMS_PER_PAGE,
        })
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page - 1)
    }
}

pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }
    (total + page_size - 1) / page_size
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
    pub total_count: i64,
}

impl<T> PageView<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: &PageRequest) -> Self {
        Self {
            items,
            total_pages: total_pages(total_count, request.page_size),
            total_count,
        }
    }

    pub fn empty() -> Self {
        Self {
            items: vec![],
            total_pages: 0,
            total_count: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_items_split_into_ceil_pages() {
        assert_eq!(total_pages(20, 10), 2);
        assert_eq!(total_pages(20, 3), 7);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(20, 50), 1);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn offset_follows_one_indexed_page() {
        let first = PageRequest::new(None).unwrap();
        assert_eq!(first.page, 1);
        assert_eq!(first.offset(), 0);

        let third = PageRequest::new(Some(3)).unwrap();
        assert_eq!(third.offset(), ITEMS_PER_PAGE * 2);
        assert_eq!(third.limit(), ITEMS_PER_PAGE);
    }

    #[test]
    fn page_past_offset_range_is_rejected() {
        assert!(matches!(
            PageRequest::new(Some(i64::MAX)),
            Err(AppError::InvalidArgument(_))
        ));

        let last = i64::MAX / ITEMS_PER_PAGE + 1;
        let request = PageRequest::new(Some(last)).unwrap();
        assert!(request.offset() > 0);
        assert!(PageRequest::new(Some(last + 1)).is_err());
    }

    #[test]
    fn page_zero_is_rejected() {
        assert!(matches!(
            PageRequest::new(Some(0)),
            Err(AppError::InvalidArgument(_))
        ));
    }
}
