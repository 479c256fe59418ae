//! Page/limit pagination math.

use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LIMIT: u64 = 10;

/// A normalized page request (`page` and `limit` are both at least 1).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build a request from optional caller input. Missing values fall back to
    /// page 1 / [`DEFAULT_LIMIT`]; values below 1 are clamped to 1.
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).max(1),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of matching records to skip before this page starts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block returned next to a page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageInfo {
    pub fn compute(request: PageRequest, total_items: u64) -> Self {
        let total_pages = total_items.div_ceil(request.limit);
        Self {
            current_page: request.page,
            total_pages,
            total_items,
            items_per_page: request.limit,
            has_next_page: request.page < total_pages,
            has_prev_page: request.page > 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        let req = PageRequest::new(None, None);
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), DEFAULT_LIMIT);
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn zero_values_are_clamped() {
        let req = PageRequest::new(Some(0), Some(0));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 1);
    }

    #[test]
    fn last_partial_page() {
        let req = PageRequest::new(Some(3), Some(10));
        assert_eq!(req.skip(), 20);

        let info = PageInfo::compute(req, 25);
        assert_eq!(info.total_pages, 3);
        assert!(!info.has_next_page);
        assert!(info.has_prev_page);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let info = PageInfo::compute(PageRequest::default(), 0);
        assert_eq!(info.total_pages, 0);
        assert!(!info.has_next_page);
        assert!(!info.has_prev_page);
    }

    #[test]
    fn serializes_camel_case() {
        let info = PageInfo::compute(PageRequest::new(Some(1), Some(5)), 6);
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["hasNextPage"], true);
        assert_eq!(json["hasPrevPage"], false);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the pages cover every item exactly once.
            #[test]
            fn pages_cover_all_items(total in 0u64..10_000, limit in 1u64..200) {
                let info = PageInfo::compute(PageRequest::new(Some(1), Some(limit)), total);
                prop_assert!(info.total_pages * limit >= total);
                if info.total_pages > 0 {
                    prop_assert!((info.total_pages - 1) * limit < total);
                }
            }

            /// Property: a next page exists iff more items follow this page.
            #[test]
            fn next_page_flag_matches_remaining_items(
                total in 0u64..10_000,
                page in 1u64..100,
                limit in 1u64..100,
            ) {
                let req = PageRequest::new(Some(page), Some(limit));
                let info = PageInfo::compute(req, total);
                prop_assert_eq!(info.has_next_page, req.skip() + limit < total);
            }
        }
    }
}
