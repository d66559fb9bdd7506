//! Page slicing and the paginator payload returned by `*WithPaginate`.

use serde::Serialize;

/// Page links shown on each side of the current page once the list is
/// collapsed.
const ON_EACH_SIDE: u32 = 3;

/// One page of rows as returned by a repository.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Row offset of the first item of `page` (1-based page numbers).
    pub fn offset(page: u32, per_page: u32) -> u64 {
        u64::from(page.max(1) - 1) * u64::from(per_page.max(1))
    }

    /// Number of pages; never less than one.
    pub fn last_page(&self) -> u32 {
        let per_page = u64::from(self.per_page.max(1));
        let pages = self.total.div_ceil(per_page).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Paginator payload, field for field what API consumers already read.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub current_page: u32,
    pub data: Vec<T>,
    pub first_page_url: String,
    pub from: Option<u64>,
    pub last_page: u32,
    pub last_page_url: String,
    pub links: Vec<PageLink>,
    pub next_page_url: Option<String>,
    pub path: String,
    pub per_page: u32,
    pub prev_page_url: Option<String>,
    pub to: Option<u64>,
    pub total: u64,
}

impl<T: Serialize> Paginated<T> {
    /// Wrap `page`, building navigation URLs from `path` (absolute route URL).
    pub fn new(page: Page<T>, path: impl Into<String>) -> Self {
        let path = path.into();
        let url = |n: u32| format!("{path}?page={n}");

        let current = page.page.max(1);
        let last = page.last_page();
        let (from, to) = if page.items.is_empty() {
            (None, None)
        } else {
            let from = Page::<T>::offset(current, page.per_page) + 1;
            (Some(from), Some(from + page.items.len() as u64 - 1))
        };

        let prev_page_url = (current > 1).then(|| url(current - 1));
        let next_page_url = (current < last).then(|| url(current + 1));

        let window = page_window(current, last);
        let mut links = Vec::with_capacity(window.len() + 2);
        links.push(PageLink {
            url: prev_page_url.clone(),
            label: "&laquo; Previous".to_string(),
            active: false,
        });
        links.extend(window.into_iter().map(|slot| match slot {
            Some(n) => PageLink {
                url: Some(url(n)),
                label: n.to_string(),
                active: n == current,
            },
            None => PageLink {
                url: None,
                label: "...".to_string(),
                active: false,
            },
        }));
        links.push(PageLink {
            url: next_page_url.clone(),
            label: "Next &raquo;".to_string(),
            active: false,
        });

        Self {
            current_page: current,
            first_page_url: url(1),
            from,
            last_page: last,
            last_page_url: url(last),
            links,
            next_page_url,
            prev_page_url,
            per_page: page.per_page,
            to,
            total: page.total,
            data: page.items,
            path,
        }
    }
}

/// Page numbers to link, with `None` marking an elided run.
///
/// Short lists are shown whole. Longer ones keep the first two and last two
/// pages plus a slider of [`ON_EACH_SIDE`] pages around `current`, so the
/// link list stays bounded however many rows there are.
fn page_window(current: u32, last: u32) -> Vec<Option<u32>> {
    let side = ON_EACH_SIDE;
    let span = side + 4;
    if last < side * 2 + 8 {
        return (1..=last).map(Some).collect();
    }

    let mut slots = Vec::new();
    if current <= span {
        slots.extend((1..=span + side).map(Some));
        slots.push(None);
        slots.extend([Some(last - 1), Some(last)]);
    } else if current > last - span {
        slots.extend([Some(1), Some(2), None]);
        slots.extend((last - (span + side - 1)..=last).map(Some));
    } else {
        slots.extend([Some(1), Some(2), None]);
        slots.extend((current - side..=current + side).map(Some));
        slots.extend([None, Some(last - 1), Some(last)]);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(items: Vec<u32>, total: u64, page: u32) -> Page<u32> {
        Page {
            items,
            total,
            page,
            per_page: 15,
        }
    }

    #[test]
    fn offset_is_zero_based_rows() {
        assert_eq!(Page::<()>::offset(1, 15), 0);
        assert_eq!(Page::<()>::offset(3, 15), 30);
        assert_eq!(Page::<()>::offset(0, 15), 0);
    }

    #[test]
    fn last_page_rounds_up_and_never_drops_below_one() {
        assert_eq!(page(vec![], 0, 1).last_page(), 1);
        assert_eq!(page(vec![], 15, 1).last_page(), 1);
        assert_eq!(page(vec![], 16, 1).last_page(), 2);
    }

    #[test]
    fn middle_page_metadata() {
        let paged = Paginated::new(page((16..=30).collect(), 40, 2), "http://h/api/orderWithPaginate");
        assert_eq!(paged.from, Some(16));
        assert_eq!(paged.to, Some(30));
        assert_eq!(paged.last_page, 3);
        assert_eq!(
            paged.prev_page_url.as_deref(),
            Some("http://h/api/orderWithPaginate?page=1")
        );
        assert_eq!(
            paged.next_page_url.as_deref(),
            Some("http://h/api/orderWithPaginate?page=3")
        );
        // previous + 3 pages + next
        assert_eq!(paged.links.len(), 5);
        assert!(paged.links[2].active);
    }

    #[test]
    fn out_of_range_page_is_empty_but_consistent() {
        let paged = Paginated::new(page(vec![], 4, 9), "http://h/api/customerWithPaginate");
        assert!(paged.data.is_empty());
        assert_eq!(paged.current_page, 9);
        assert_eq!(paged.last_page, 1);
        assert_eq!(paged.total, 4);
        assert_eq!(paged.from, None);
        assert_eq!(paged.to, None);
        assert!(paged.next_page_url.is_none());
        assert_eq!(
            paged.prev_page_url.as_deref(),
            Some("http://h/api/customerWithPaginate?page=8")
        );
    }

    fn labels(links: &[PageLink]) -> Vec<&str> {
        links.iter().map(|l| l.label.as_str()).collect()
    }

    #[test]
    fn short_link_lists_are_complete() {
        assert_eq!(page_window(1, 1), vec![Some(1)]);
        assert_eq!(page_window(5, 13).len(), 13);
    }

    #[test]
    fn long_link_lists_collapse_around_current_page() {
        let start = page_window(2, 100);
        assert_eq!(start.len(), 13);
        assert_eq!(start[9], Some(10));
        assert_eq!(start[10], None);
        assert_eq!(start[12], Some(100));

        let end = page_window(99, 100);
        assert_eq!(&end[..3], &[Some(1), Some(2), None]);
        assert_eq!(end[3], Some(91));
        assert_eq!(end.len(), 13);

        let middle = page_window(50, 100);
        assert_eq!(
            middle,
            vec![
                Some(1), Some(2), None,
                Some(47), Some(48), Some(49), Some(50), Some(51), Some(52), Some(53),
                None, Some(99), Some(100),
            ]
        );
    }

    #[test]
    fn link_count_is_bounded_for_large_tables() {
        let paged = Paginated::new(page((0..15).collect(), 1_000_000, 500), "http://h/api/order");
        assert_eq!(paged.last_page, 66_667);
        assert_eq!(paged.links.len(), 15);
        let labels = labels(&paged.links);
        assert_eq!(labels[3], "...");
        assert_eq!(labels[7], "500");
        assert!(paged.links[7].active);
        assert_eq!(paged.links[3].url, None);
        assert_eq!(labels[14], "Next &raquo;");
    }
}
