use serde::Serialize;

/// Pages always listed at the start and end of the control.
const EDGE_PAGES: usize = 2;
/// Pages listed before and after the current one.
const PAGES_BEFORE: usize = 2;
const PAGES_AFTER: usize = 4;

/// Page numbers to render around `page`; `None` marks a run of hidden pages.
fn page_window(total_pages: usize, page: usize) -> Vec<Option<usize>> {
    let near_current = page.saturating_sub(PAGES_BEFORE)..=page + PAGES_AFTER;
    let shown = |p: usize| {
        p <= EDGE_PAGES || p + EDGE_PAGES > total_pages || near_current.contains(&p)
    };

    let mut pages = Vec::new();
    for p in 1..=total_pages {
        if shown(p) {
            pages.push(Some(p));
        } else if pages.last() != Some(&None) {
            pages.push(None);
        }
    }
    pages
}

/// Pagination controls shown under the order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageControls {
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    /// First row number on this page, 0 when there are no rows.
    pub first_row: usize,
    /// Last row number on this page.
    pub last_row: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<Option<usize>>,
}

impl PageControls {
    pub fn new(page: usize, page_size: usize, total_count: usize, total_pages: usize) -> Self {
        let page = page.max(1);
        let last_row = (page * page_size).min(total_count);
        let first_row = if total_count == 0 {
            0
        } else {
            ((page - 1) * page_size + 1).min(last_row)
        };

        Self {
            page,
            total_pages,
            total_count,
            first_row,
            last_row,
            has_previous: page > 1,
            has_next: page < total_pages,
            pages: page_window(total_pages, page),
        }
    }

    /// "Showing X to Y of Z results".
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} results",
            self.first_row, self.last_row, self.total_count
        )
    }
}
