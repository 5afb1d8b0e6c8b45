use crate::errors::EngineError;
use crate::models::{PageRequest, PageResult};

/// Slices an ordered collection into one fixed-size page.
///
/// `total_pages` is `ceil(total_items / page_size)`. An out-of-range page
/// number (including 0, pages are 1-based) yields empty `items`, not an
/// error; only a non-positive page size is rejected.
pub fn paginate<T: Clone>(items: &[T], request: &PageRequest) -> Result<PageResult<T>, EngineError> {
    if request.page_size == 0 {
        return Err(EngineError::InvalidPageSize {
            page_size: request.page_size,
        });
    }

    let total_items = items.len();
    let total_pages = total_items.div_ceil(request.page_size);

    let page_items = if request.page_number == 0 {
        Vec::new()
    } else {
        let start = (request.page_number - 1).saturating_mul(request.page_size);
        if start >= total_items {
            Vec::new()
        } else {
            let end = (start + request.page_size).min(total_items);
            items[start..end].to_vec()
        }
    };

    Ok(PageResult {
        items: page_items,
        total_items,
        total_pages,
        page_number: request.page_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(page_number: usize, page_size: usize) -> PageRequest {
        PageRequest {
            page_number,
            page_size,
        }
    }

    #[test]
    fn slices_middle_page() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, &request(2, 4)).unwrap();
        assert_eq!(page.items, vec![5, 6, 7, 8]);
        assert_eq!(page.total_items, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_number, 2);
    }

    #[test]
    fn last_page_may_be_short() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, &request(3, 4)).unwrap();
        assert_eq!(page.items, vec![9, 10]);
    }

    #[test]
    fn out_of_range_page_is_empty_not_an_error() {
        let items: Vec<u32> = (1..=10).collect();
        let page = paginate(&items, &request(7, 4)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 3);

        let zero = paginate(&items, &request(0, 4)).unwrap();
        assert!(zero.items.is_empty());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let items: Vec<u32> = vec![1, 2, 3];
        let err = paginate(&items, &request(1, 0)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidPageSize { page_size: 0 }));
    }

    #[test]
    fn empty_collection_has_zero_pages() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, &request(1, 25)).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn concatenated_pages_reproduce_the_collection() {
        let items: Vec<u32> = (1..=23).collect();
        let size = 5;
        let total_pages = paginate(&items, &request(1, size)).unwrap().total_pages;
        let mut rebuilt = Vec::new();
        for page_number in 1..=total_pages {
            rebuilt.extend(paginate(&items, &request(page_number, size)).unwrap().items);
        }
        assert_eq!(rebuilt, items);
    }
}
