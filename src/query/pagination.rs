//! Page arithmetic.

/// Number of pages needed for `total_count` items; zero when there are none.
#[must_use]
pub fn total_pages(total_count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(page_size)
}

/// Clamp a requested page into `[1, total_pages]` (page 1 when empty).
#[must_use]
pub fn clamp_page(page: usize, total_count: usize, page_size: usize) -> usize {
    let last = total_pages(total_count, page_size).max(1);
    page.clamp(1, last)
}

/// Index range of a 1-based page inside `len` items; empty past the end.
pub(crate) fn page_bounds(len: usize, page: usize, page_size: usize) -> std::ops::Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= len {
        return len..len;
    }
    start..start.saturating_add(page_size).min(len)
}

/// Page numbers to show in a pager with at most `max_visible` buttons.
///
/// All pages when they fit; otherwise a window that sticks to the first or
/// last pages near either end and centres on `current` in between.
///
/// # Examples
///
/// ```
/// use crm_engine::query::visible_pages;
///
/// assert_eq!(visible_pages(1, 3, 5), vec![1, 2, 3]);
/// assert_eq!(visible_pages(6, 20, 5), vec![4, 5, 6, 7, 8]);
/// assert_eq!(visible_pages(19, 20, 5), vec![16, 17, 18, 19, 20]);
/// ```
#[must_use]
pub fn visible_pages(current: usize, total_pages: usize, max_visible: usize) -> Vec<usize> {
    if max_visible == 0 || total_pages == 0 {
        return Vec::new();
    }
    if total_pages <= max_visible {
        return (1..=total_pages).collect();
    }

    let half = max_visible / 2;
    let first = if current <= half + 1 {
        1
    } else if current + half >= total_pages {
        total_pages - max_visible + 1
    } else {
        current - half
    };
    (first..first + max_visible).collect()
}
