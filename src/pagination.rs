// ABOUTME: Page-number pagination for in-memory lists shown on the dashboard
// ABOUTME: Clamps the requested page, computes navigation fields and a page-number window
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use serde::{Deserialize, Serialize};

/// Default items per page
pub const DEFAULT_PER_PAGE: usize = 10;

/// Most page numbers shown at once
pub const MAX_PAGE_LINKS: usize = 5;

/// One page of a list plus navigation metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Items across all pages
    pub total: usize,
    /// Current page (1-based, clamped into range)
    pub page: usize,
    /// Items per page
    pub per_page: usize,
    /// Number of pages, at least 1
    pub total_pages: usize,
    /// A previous page exists
    pub has_prev: bool,
    /// A next page exists
    pub has_next: bool,
    /// Previous page number
    pub prev_page: Option<usize>,
    /// Next page number
    pub next_page: Option<usize>,
    /// 1-based index of the first item shown, 0 when empty
    pub start_index: usize,
    /// 1-based index of the last item shown
    pub end_index: usize,
    /// Page numbers to render around the current page
    pub pages: Vec<usize>,
    /// "Showing X-Y of Z" line
    pub summary: String,
}

/// Slice `items` into page `page` of `per_page` items
///
/// Out-of-range pages are clamped; a zero `per_page` falls back to the default.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page: usize, per_page: usize) -> Page<T> {
    let per_page = if per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        per_page
    };
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * per_page;
    let end = (start + per_page).min(total);
    let slice = items.get(start..end).unwrap_or_default().to_vec();

    let start_index = if total > 0 { start + 1 } else { 0 };
    let summary = if total == 0 {
        "No videos found".to_owned()
    } else {
        format!("Showing {start_index}-{end} of {total} (page {page}/{total_pages})")
    };

    Page {
        items: slice,
        total,
        page,
        per_page,
        total_pages,
        has_prev: page > 1,
        has_next: page < total_pages,
        prev_page: (page > 1).then_some(page - 1),
        next_page: (page < total_pages).then_some(page + 1),
        start_index,
        end_index: end,
        pages: page_window(page, total_pages, MAX_PAGE_LINKS),
        summary,
    }
}

/// Up to `max_display` consecutive page numbers around `current`
#[must_use]
pub fn page_window(current: usize, total_pages: usize, max_display: usize) -> Vec<usize> {
    if total_pages <= max_display {
        return (1..=total_pages).collect();
    }
    let half = max_display / 2;
    let mut start = current.saturating_sub(half).max(1);
    let end = (start + max_display - 1).min(total_pages);
    if end + 1 - start < max_display {
        start = (end + 1).saturating_sub(max_display).max(1);
    }
    (start..=end).collect()
}
