use serde::Serialize;

use crate::page::request::{Request, ResourceRoute};

/// Page window of a server-side list. Rebuilt from the store on every
/// response, never carried over between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub last_page: u64,
}

impl Pagination {
    /// Out-of-range requests land on the nearest existing page.
    pub fn new(total: u64, per_page: u64, requested: Option<u64>) -> Self {
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);
        let current_page = requested.unwrap_or(1).clamp(1, last_page);
        Self {
            total,
            per_page,
            current_page,
            last_page,
        }
    }

    pub fn offset(&self) -> u64 {
        (self.current_page - 1) * self.per_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn visit(&self, page: u64, route: &ResourceRoute) -> Option<Request> {
        (1..=self.last_page)
            .contains(&page)
            .then(|| Request::get(route.page(page)))
    }

    pub fn previous(&self, route: &ResourceRoute) -> Option<Request> {
        if !self.has_previous() {
            return None;
        }
        self.visit(self.current_page - 1, route)
    }

    pub fn next(&self, route: &ResourceRoute) -> Option<Request> {
        if !self.has_next() {
            return None;
        }
        self.visit(self.current_page + 1, route)
    }

    pub fn controls(&self, route: &ResourceRoute) -> PaginationControls {
        let pages = (1..=self.last_page)
            .map(|number| PageLink {
                number,
                url: route.page(number),
                current: number == self.current_page,
            })
            .collect();
        PaginationControls {
            current_page: self.current_page,
            last_page: self.last_page,
            total: self.total,
            previous_url: self.previous(route).map(|request| request.url),
            next_url: self.next(route).map(|request| request.url),
            pages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub number: u64,
    pub url: String,
    pub current: bool,
}

/// Control strip; a `None` url renders as a disabled button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationControls {
    pub current_page: u64,
    pub last_page: u64,
    pub total: u64,
    pub previous_url: Option<String>,
    pub next_url: Option<String>,
    pub pages: Vec<PageLink>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::request::Method;

    fn route() -> ResourceRoute {
        ResourceRoute::new(2, "pengeluaran")
    }

    #[test]
    fn middle_page_enables_both_directions() {
        let pagination = Pagination::new(50, 10, Some(2));
        assert_eq!(pagination.last_page, 5);
        assert!(pagination.has_previous());
        assert!(pagination.has_next());
    }

    #[test]
    fn edges_disable_one_direction() {
        let first = Pagination::new(50, 10, Some(1));
        assert!(!first.has_previous());
        assert!(first.previous(&route()).is_none());
        assert!(first.has_next());

        let last = Pagination::new(50, 10, Some(5));
        assert!(!last.has_next());
        assert!(last.next(&route()).is_none());
        assert!(last.has_previous());
    }

    #[test]
    fn requested_page_is_clamped() {
        assert_eq!(Pagination::new(21, 10, Some(9)).current_page, 3);
        assert_eq!(Pagination::new(21, 10, Some(0)).current_page, 1);
        assert_eq!(Pagination::new(21, 10, None).current_page, 1);
    }

    #[test]
    fn empty_list_has_one_page() {
        let pagination = Pagination::new(0, 10, Some(3));
        assert_eq!(pagination.last_page, 1);
        assert_eq!(pagination.offset(), 0);
        assert!(!pagination.has_next());
    }

    #[test]
    fn visit_issues_get_for_page() {
        let pagination = Pagination::new(30, 10, Some(1));
        let request = pagination.visit(3, &route()).expect("request");
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url, "/unit/2/pengeluaran?page=3");
        assert!(pagination.visit(4, &route()).is_none());
    }

    #[test]
    fn controls_mark_current_page() {
        let controls = Pagination::new(25, 10, Some(2)).controls(&route());
        assert_eq!(controls.pages.len(), 3);
        assert!(controls.pages[1].current);
        assert_eq!(controls.previous_url.as_deref(), Some("/unit/2/pengeluaran?page=1"));
        assert_eq!(controls.next_url.as_deref(), Some("/unit/2/pengeluaran?page=3"));
    }
}
