pub const PAGE_SIZE: usize = 8;

/// Number of pages needed for `len` items. Zero items means zero pages.
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Items of 1-based page `page`. Pages outside the range are empty.
pub fn page_slice<T>(items: &[T], page: usize) -> &[T] {
    if page == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(PAGE_SIZE).min(items.len());
    let end = page.saturating_mul(PAGE_SIZE).min(items.len());
    &items[start..end]
}

pub fn next(page: usize, len: usize) -> Option<usize> {
    (page < page_count(len)).then(|| page + 1)
}

pub fn prev(page: usize) -> Option<usize> {
    (page > 1).then(|| page - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    Prev,
    Number(usize),
    Next,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub kind: ButtonKind,
    pub disabled: bool,
    pub active: bool,
}

/// The control strip: Prev, one button per page, Next. Empty when there is nothing to page.
pub fn buttons(page: usize, len: usize) -> Vec<PageButton> {
    let total = page_count(len);
    if total == 0 {
        return Vec::new();
    }

    let mut strip = Vec::with_capacity(total + 2);
    strip.push(PageButton {
        kind: ButtonKind::Prev,
        disabled: page == 1,
        active: false,
    });
    for n in 1..=total {
        strip.push(PageButton {
            kind: ButtonKind::Number(n),
            disabled: n == page,
            active: n == page,
        });
    }
    strip.push(PageButton {
        kind: ButtonKind::Next,
        disabled: page == total,
        active: false,
    });
    strip
}
