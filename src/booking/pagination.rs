use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// One 1-based page of an in-memory list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn prev(&self) -> Option<usize> {
        (self.number > 1).then(|| self.number - 1)
    }

    pub fn next(&self) -> Option<usize> {
        (self.number < self.total_pages).then(|| self.number + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slice `items` into page `number`. Out-of-range page numbers clamp to the
/// nearest existing page; an empty list yields zero pages.
pub fn paginate<T>(items: Vec<T>, number: usize, size: usize) -> Page<T> {
    let size = size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(size);
    let number = number.clamp(1, total_pages.max(1));

    let items = items
        .into_iter()
        .skip((number - 1) * size)
        .take(size)
        .collect();

    Page {
        items,
        number,
        size,
        total_items,
        total_pages,
    }
}
