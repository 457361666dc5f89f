//! Pagination primitive shared by the list views.
//!
//! Page numbers are 1-based. A request for a page outside `1..=num_pages`
//! is clamped to the nearest valid page, and an unparseable page number
//! falls back to the first page. An empty result set still has one (empty)
//! page.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,

    /// 1-based number of this page.
    pub number: u64,

    pub num_pages: u64,

    pub total_items: u64,

    pub page_size: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.number > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.number < self.num_pages
    }

    #[must_use]
    pub const fn previous_page_number(&self) -> u64 {
        if self.number > 1 { self.number - 1 } else { 1 }
    }

    #[must_use]
    pub const fn next_page_number(&self) -> u64 {
        if self.number < self.num_pages {
            self.number + 1
        } else {
            self.num_pages
        }
    }

    /// 1-based index of the first item on this page, 0 when the page is empty.
    #[must_use]
    pub const fn start_index(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            (self.number - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last item on this page.
    #[must_use]
    pub fn end_index(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            self.start_index() + self.items.len() as u64 - 1
        }
    }
}

/// Number of pages needed for `total_items`, never less than one.
#[must_use]
pub const fn page_count(total_items: u64, page_size: u64) -> u64 {
    if total_items == 0 || page_size == 0 {
        1
    } else {
        total_items.div_ceil(page_size)
    }
}

/// Parses a raw `page` query value. Anything that is not an integer is page 1.
#[must_use]
pub fn parse_page_number(raw: Option<&str>) -> i64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(1)
}

/// Clamps a requested page number into `1..=num_pages`.
#[must_use]
pub fn clamp_page(requested: i64, num_pages: u64) -> u64 {
    let last = num_pages.max(1);
    match u64::try_from(requested) {
        Ok(0) | Err(_) => 1,
        Ok(n) => n.min(last),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_of(number: u64, total: u64) -> Page<u64> {
        let num_pages = page_count(total, 10);
        let start = (number - 1) * 10;
        let items = (start + 1..=(start + 10).min(total)).collect();
        Page {
            items,
            number,
            num_pages,
            total_items: total,
            page_size: 10,
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 10), 3);
    }

    #[test]
    fn test_parse_page_number() {
        assert_eq!(parse_page_number(None), 1);
        assert_eq!(parse_page_number(Some("3")), 3);
        assert_eq!(parse_page_number(Some(" 2 ")), 2);
        assert_eq!(parse_page_number(Some("abc")), 1);
        assert_eq!(parse_page_number(Some("")), 1);
        assert_eq!(parse_page_number(Some("-4")), -4);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(1, 3), 1);
        assert_eq!(clamp_page(3, 3), 3);
        assert_eq!(clamp_page(4, 3), 3);
        assert_eq!(clamp_page(999, 3), 3);
        assert_eq!(clamp_page(0, 3), 1);
        assert_eq!(clamp_page(-2, 3), 1);
        assert_eq!(clamp_page(5, 0), 1);
    }

    #[test]
    fn test_navigation() {
        let first = page_of(1, 25);
        assert!(!first.has_previous());
        assert!(first.has_next());
        assert_eq!(first.next_page_number(), 2);
        assert_eq!(first.start_index(), 1);
        assert_eq!(first.end_index(), 10);

        let last = page_of(3, 25);
        assert!(last.has_previous());
        assert!(!last.has_next());
        assert_eq!(last.previous_page_number(), 2);
        assert_eq!(last.start_index(), 21);
        assert_eq!(last.end_index(), 25);
    }

    #[test]
    fn test_empty_page() {
        let empty: Page<u64> = Page {
            items: vec![],
            number: 1,
            num_pages: 1,
            total_items: 0,
            page_size: 10,
        };
        assert!(!empty.has_previous() && !empty.has_next());
        assert_eq!(empty.start_index(), 0);
        assert_eq!(empty.end_index(), 0);
    }
}
