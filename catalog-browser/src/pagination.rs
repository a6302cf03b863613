//! Page arithmetic for browse results

use serde::Serialize;
use std::num::NonZeroU32;

/// Position of a page within a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number after normalization
    pub page: u64,

    /// Rows per page
    pub page_size: u32,

    /// Rows skipped before this page
    pub offset: u64,

    /// Number of non-empty pages; 0 for an empty table
    pub total_pages: u64,

    /// Row count the page was computed against
    pub total_rows: u64,
}

/// Compute the offset and page totals for a requested page
///
/// Pages below 1 are normalized to 1. Pages past the end are allowed and
/// simply contain no rows. An empty table has zero pages.
///
/// The offset saturates at `i64::MAX`, the largest value a bound SQL parameter
/// can carry.
pub fn paginate(total_rows: u64, requested_page: i64, page_size: NonZeroU32) -> Pagination {
    let page = requested_page.max(1) as u64;
    let size = u64::from(page_size.get());

    let offset = (page - 1)
        .checked_mul(size)
        .unwrap_or(u64::MAX)
        .min(i64::MAX as u64);

    Pagination {
        page,
        page_size: page_size.get(),
        offset,
        total_pages: total_rows.div_ceil(size),
        total_rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn test_paginate_first_and_last_page() {
        let first = paginate(95, 1, size(20));
        assert_eq!(first.offset, 0);
        assert_eq!(first.total_pages, 5);

        let last = paginate(95, 5, size(20));
        assert_eq!(last.offset, 80);
        assert_eq!(last.total_pages, 5);
        assert_eq!(last.total_rows, 95);
    }

    #[test]
    fn test_paginate_normalizes_low_pages() {
        assert_eq!(paginate(95, 0, size(20)), paginate(95, 1, size(20)));
        assert_eq!(paginate(95, -7, size(20)).page, 1);
    }

    #[test]
    fn test_paginate_empty_table_has_no_pages() {
        let empty = paginate(0, 1, size(20));
        assert_eq!(empty.total_pages, 0);
        assert_eq!(empty.offset, 0);
    }

    #[test]
    fn test_paginate_exact_multiple() {
        assert_eq!(paginate(100, 1, size(20)).total_pages, 5);
        assert_eq!(paginate(101, 1, size(20)).total_pages, 6);
    }

    #[test]
    fn test_paginate_beyond_last_page() {
        let page = paginate(95, 9, size(20));
        assert_eq!(page.page, 9);
        assert_eq!(page.offset, 160);
    }

    #[test]
    fn test_paginate_offset_saturates() {
        let page = paginate(10, i64::MAX, size(u32::MAX));
        assert_eq!(page.offset, i64::MAX as u64);
    }
}
