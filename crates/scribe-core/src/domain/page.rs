//! Pagination of post listings.

use serde::{Deserialize, Serialize};

/// Fixed page size for post listings.
pub const POSTS_PER_PAGE: u64 = 5;

/// One page of an ordered result set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served (after clamping).
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// An empty first page, used when a filter matches nothing.
    pub fn empty(page_size: u64) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            page_size,
            total_items: 0,
            total_pages: 0,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Clamp a requested 1-based page number into the valid range.
///
/// Requests below 1 serve page 1; requests past the end serve the last
/// page. An empty result set serves (an empty) page 1.
pub fn clamp_page(requested: u64, total_pages: u64) -> u64 {
    requested.max(1).min(total_pages.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_defaults_to_first_page() {
        assert_eq!(clamp_page(0, 7), 1);
    }

    #[test]
    fn in_range_is_unchanged() {
        assert_eq!(clamp_page(3, 7), 3);
        assert_eq!(clamp_page(7, 7), 7);
    }

    #[test]
    fn past_the_end_clamps_to_last_page() {
        assert_eq!(clamp_page(99, 7), 7);
    }

    #[test]
    fn empty_set_serves_page_one() {
        assert_eq!(clamp_page(1, 0), 1);
        assert_eq!(clamp_page(12, 0), 1);
    }

    #[test]
    fn page_navigation_flags() {
        let page: Paginated<u32> = Paginated {
            items: vec![1, 2, 3, 4, 5],
            page: 2,
            page_size: POSTS_PER_PAGE,
            total_items: 12,
            total_pages: 3,
        };
        assert!(page.has_previous());
        assert!(page.has_next());

        let empty: Paginated<u32> = Paginated::empty(POSTS_PER_PAGE);
        assert!(!empty.has_previous());
        assert!(!empty.has_next());
    }
}
