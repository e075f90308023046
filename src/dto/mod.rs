//! Response shapes returned by the HTTP surface.

use serde::Serialize;

pub mod admin;
pub mod merchant;

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDto<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub pages: usize,
    pub total: usize,
}

impl<T> PageDto<T> {
    /// Build a page from the total match count and the requested page size.
    pub fn new(items: Vec<T>, page: usize, total: usize, per_page: usize) -> Self {
        Self {
            items,
            page,
            pages: total.div_ceil(per_page.max(1)),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        let page = PageDto::new(vec![1, 2], 1, 21, 20);
        assert_eq!(page.pages, 2);
        assert_eq!(page.total, 21);
    }
}
