use serde::{Deserialize, Serialize};

/// Events shown per page
pub const PAGE_SIZE: usize = 10;

/// Number of pages for `count` items, never less than one
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

/// Current 1-based page index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    current_page: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self { current_page: 1 }
    }
}

impl PageState {
    pub fn current(&self) -> usize {
        self.current_page
    }

    /// Jump to `page`, clamped to the pages `count` items fill
    pub fn go_to(self, page: usize, count: usize) -> Self {
        Self {
            current_page: page.clamp(1, total_pages(count)),
        }
    }

    pub fn next(self, count: usize) -> Self {
        self.go_to(self.current_page.saturating_add(1), count)
    }

    pub fn prev(self, count: usize) -> Self {
        self.go_to(self.current_page.saturating_sub(1), count)
    }

    /// Keep the page valid after the item count changed
    pub fn clamp(self, count: usize) -> Self {
        self.go_to(self.current_page, count)
    }

    /// Items on the current page
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.current_page - 1).saturating_mul(PAGE_SIZE).min(items.len());
        let end = start.saturating_add(PAGE_SIZE).min(items.len());
        &items[start..end]
    }
}
