// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

const WINDOW: i64 = 5;
const HALF: i64 = WINDOW / 2;

/// One entry of a compact pager. Ellipses are placeholders and never jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLabel {
    Page(usize),
    LeftEllipsis,
    RightEllipsis,
}

impl PageLabel {
    pub const fn page(self) -> Option<usize> {
        match self {
            Self::Page(page) => Some(page),
            Self::LeftEllipsis | Self::RightEllipsis => None,
        }
    }
}

pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice `[(page-1)*size, page*size)` clamped to `items`. Page 0 is empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

/// Pager labels for `current` of `total`: page 1, a window of up to five
/// interior pages around `current`, ellipses for gaps, and the last page.
///
/// The window clamps in a fixed order: centre on `current`, pin to the start
/// when `current` is near page 1, pin to the end when near the last page,
/// then clamp into `[2, total-1]`.
pub fn page_labels(current: usize, total: usize) -> Vec<PageLabel> {
    let current = i64::try_from(current).unwrap_or(i64::MAX);
    let total = i64::try_from(total).unwrap_or(i64::MAX);

    let mut start = (current - HALF).max(2);
    let mut end = (current.saturating_add(HALF)).min(total - 1);
    if current <= HALF {
        end = WINDOW;
    }
    if current.saturating_add(HALF) >= total {
        start = total - WINDOW + 1;
    }
    start = start.max(2);
    end = end.min(total - 1);

    let mut labels = vec![PageLabel::Page(1)];
    if start > 2 {
        labels.push(PageLabel::LeftEllipsis);
    }
    for page in start..=end {
        if page > 1 && page < total {
            labels.push(PageLabel::Page(to_page(page)));
        }
    }
    if end < total - 1 {
        labels.push(PageLabel::RightEllipsis);
    }
    if total > 1 {
        labels.push(PageLabel::Page(to_page(total)));
    }
    labels
}

fn to_page(value: i64) -> usize {
    usize::try_from(value).unwrap_or(0)
}
