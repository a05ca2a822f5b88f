use serde::Serialize;

use super::error::FilterError;

/// Questions shown per dashboard page
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Slice one page out of `items`. Pages are 1-based; the requested page is
/// clamped into `[1, total_pages]` and an empty list still has one page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Result<Page<T>, FilterError> {
    if page_size == 0 {
        return Err(FilterError::InvalidPageSize(page_size));
    }

    let total = items.len();
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);

    Ok(Page {
        items: items[start.min(total)..end].to_vec(),
        page,
        total_pages,
        total,
    })
}
