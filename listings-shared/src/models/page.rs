/// Pagination envelope shared by list endpoints
///
/// The wire format mirrors the shape the frontend already consumes:
/// `content`, `totalElements`, `totalPages`, `number`, `size`.
///
/// # Example
///
/// ```
/// use listings_shared::models::page::Page;
///
/// let page = Page::new(vec!["a", "b"], 5, 0, 2);
/// assert_eq!(page.total_pages, 3);
/// assert_eq!(page.number, 0);
/// ```

use serde::Serialize;

/// One page of results plus paging metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub content: Vec<T>,

    /// Total matching items across all pages
    pub total_elements: i64,

    /// Total number of pages at the current page size
    pub total_pages: i64,

    /// Current page index (0-based)
    pub number: i64,

    /// Requested page size
    pub size: i64,
}

impl<T> Page<T> {
    /// Builds a page from one page of content and the total match count
    ///
    /// `number` is the 0-based page index, `size` the requested page size.
    pub fn new(content: Vec<T>, total_elements: i64, number: i64, size: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };

        Self {
            content,
            total_elements,
            total_pages,
            number,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: Page<i32> = Page::new(vec![], 25, 0, 12);
        assert_eq!(page.total_pages, 3);

        let page: Page<i32> = Page::new(vec![], 24, 0, 12);
        assert_eq!(page.total_pages, 2);

        let page: Page<i32> = Page::new(vec![], 0, 0, 12);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_zero_size_is_safe() {
        let page: Page<i32> = Page::new(vec![], 10, 0, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let page = Page::new(vec![1, 2], 2, 0, 12);
        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["totalElements"], 2);
        assert_eq!(json["totalPages"], 1);
        assert_eq!(json["number"], 0);
        assert_eq!(json["size"], 12);
        assert_eq!(json["content"], serde_json::json!([1, 2]));
    }
}
