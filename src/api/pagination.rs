//! Pagination utilities for list endpoints

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Pagination query parameters
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PaginationParams {
    /// Page number (1-indexed)
    pub page: Option<u32>,

    /// Items per page
    pub per_page: Option<u32>,
}

impl PaginationParams {
    /// Maximum allowed items per page
    pub const MAX_PER_PAGE: u32 = 100;

    /// Default page size for catalog list views
    pub const DEFAULT_PER_PAGE: u32 = 12;

    /// Returns the clamped per_page value
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(Self::DEFAULT_PER_PAGE)
            .clamp(1, Self::MAX_PER_PAGE)
    }

    /// Returns the page (1-indexed, minimum 1)
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Calculate SQL OFFSET
    pub fn offset(&self) -> i64 {
        i64::from((self.page() - 1) * self.per_page())
    }

    /// Calculate SQL LIMIT
    pub fn limit(&self) -> i64 {
        i64::from(self.per_page())
    }
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total_items: u64) -> Self {
        let per_page = params.per_page();
        let page = params.page();
        let total_pages = total_items.div_ceil(u64::from(per_page)) as u32;

        Self {
            page,
            per_page,
            total_items,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(data: Vec<T>, params: &PaginationParams, total_items: u64) -> Self {
        Self {
            data,
            pagination: PaginationMeta::new(params, total_items),
            meta: None,
        }
    }

    /// Attach extra listing metadata (e.g. the published price range).
    pub fn with_meta(mut self, meta: serde_json::Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<u32>, per_page: Option<u32>) -> PaginationParams {
        PaginationParams { page, per_page }
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(params(None, None).per_page(), 12);
        assert_eq!(params(None, Some(0)).per_page(), 1);
        assert_eq!(params(None, Some(500)).per_page(), 100);
    }

    #[test]
    fn offset_follows_page() {
        assert_eq!(params(Some(1), Some(12)).offset(), 0);
        assert_eq!(params(Some(3), Some(12)).offset(), 24);
        // page 0 is treated as page 1
        assert_eq!(params(Some(0), Some(12)).offset(), 0);
    }

    #[test]
    fn meta_computes_page_boundaries() {
        let meta = PaginationMeta::new(&params(Some(2), Some(10)), 35);
        assert_eq!(meta.total_pages, 4);
        assert!(meta.has_next);
        assert!(meta.has_prev);

        let meta = PaginationMeta::new(&params(Some(1), Some(10)), 0);
        assert_eq!(meta.total_pages, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }
}
