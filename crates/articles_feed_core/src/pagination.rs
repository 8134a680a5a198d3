//! Page window normalization and offset arithmetic.
//!
//! # Invariants
//! - A normalized window always has `page >= 1` and `page_size >= 1`.
//! - The same window drives the page query and the echoed page metadata.

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Normalized `(page, page_size)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: i64,
    page_size: i64,
}

impl PageWindow {
    /// Coerces `page <= 0` to 1 and `page_size <= 0` to 20.
    ///
    /// No upper bound is applied to `page_size`.
    pub fn normalize(page: i64, page_size: i64) -> Self {
        Self {
            page: if page <= 0 { DEFAULT_PAGE } else { page },
            page_size: if page_size <= 0 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows to skip: `page_size * (page - 1)`, saturating at `i64::MAX`.
    pub fn offset(&self) -> i64 {
        self.page_size.saturating_mul(self.page - 1)
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::normalize(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::PageWindow;

    #[test]
    fn non_positive_values_fall_back_to_defaults() {
        for (page, page_size) in [(0, 0), (-3, -1), (i64::MIN, 0)] {
            let window = PageWindow::normalize(page, page_size);
            assert_eq!(window.page(), 1);
            assert_eq!(window.page_size(), 20);
            assert_eq!(window.offset(), 0);
        }
    }

    #[test]
    fn offset_uses_requested_window() {
        let window = PageWindow::normalize(3, 25);
        assert_eq!(window.offset(), 50);

        let window = PageWindow::normalize(1, 500);
        assert_eq!(window.page_size(), 500);
        assert_eq!(window.offset(), 0);
    }

    #[test]
    fn offset_saturates_instead_of_overflowing() {
        let window = PageWindow::normalize(i64::MAX, i64::MAX);
        assert_eq!(window.offset(), i64::MAX);
    }
}
