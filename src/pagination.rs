//! Pagination of table rows

use serde::{Deserialize, Serialize};

/// One page of a table.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page number, starting at 1
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Return the requested page of rows.
///
/// Pages past the end are empty rather than an error, so that a table whose rows shrank between
/// two requests still renders.
///
/// # Arguments
///
/// * `rows`: All rows, in display order
/// * `page`: Page number, starting at 1
/// * `page_size`: Number of rows per page, greater than 0
pub fn paginate<T>(rows: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total_items = rows.len();
    let total_pages = (total_items + page_size - 1) / page_size;
    let items = rows
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    Page {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}
