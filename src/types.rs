/// Shared types used across the codebase
use serde::Serialize;

use crate::config;

/// Zero-based page request. Size is clamped to the configured maximum so a
/// client cannot request unbounded reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        let max_size = config::config().api.max_page_size;
        Self {
            page: page.max(0),
            size: size.clamp(1, max_size),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.page * self.size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, config::config().api.default_page_size)
    }
}

/// Paginated response wrapper: a content slice plus camelCase paging
/// metadata (totalElements, totalPages, first/last markers).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: i64) -> Self {
        let number = request.page();
        let size = request.size();
        let total_pages = if total_elements == 0 {
            0
        } else {
            (total_elements + size - 1) / size
        };
        let number_of_elements = content.len() as i64;
        let empty = content.is_empty();

        Self {
            content,
            number,
            size,
            total_elements,
            total_pages,
            number_of_elements,
            first: number == 0,
            last: number + 1 >= total_pages,
            empty,
        }
    }
}
