use crate::model::record::Record;

/// Display order of a listing. Storage order is always insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Insertion,
    Id,
}

/// Case-insensitive substring match over the record's search fields.
/// A blank query matches everything.
pub fn matches<R: Record>(record: &R, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&q))
}

pub fn filter_records<'a, R: Record>(items: &'a [R], query: &str) -> Vec<&'a R> {
    items.iter().filter(|r| matches(*r, query)).collect()
}

/// Number of pages needed for `len` rows; never less than one.
pub fn total_pages(len: usize, per_page: usize) -> usize {
    let per_page = per_page.max(1);
    len.div_ceil(per_page).max(1)
}

/// Clamp a 1-based page number into `1..=total_pages`.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One page of a filtered listing.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: Vec<&'a T>,
    /// 1-based, already clamped.
    pub page: usize,
    pub total_pages: usize,
    /// Rows matching the query, across all pages.
    pub matched: usize,
    /// Row number (0-based) of the first item on this page.
    pub offset: usize,
}

pub fn paginate<T>(rows: Vec<&T>, page: usize, per_page: usize) -> Page<'_, T> {
    let per_page = per_page.max(1);
    let matched = rows.len();
    let total_pages = total_pages(matched, per_page);
    let page = clamp_page(page, total_pages);
    let offset = (page - 1) * per_page;
    let items = rows.into_iter().skip(offset).take(per_page).collect();
    Page {
        items,
        page,
        total_pages,
        matched,
        offset,
    }
}

/// Search, sort, and page settings of a list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub page: usize,
    pub per_page: usize,
    pub sort: SortOrder,
}

impl ListQuery {
    pub fn new(per_page: usize) -> Self {
        ListQuery {
            search: String::new(),
            page: 1,
            per_page: per_page.max(1),
            sort: SortOrder::Insertion,
        }
    }

    /// Change the search text; the listing restarts at page one.
    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn apply<'a, R: Record>(&self, items: &'a [R]) -> Page<'a, R> {
        let mut rows = filter_records(items, &self.search);
        if self.sort == SortOrder::Id {
            rows.sort_by_key(|r| r.id());
        }
        paginate(rows, self.page, self.per_page)
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.page = clamp_page(self.page + 1, total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.page = clamp_page(page, total_pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::project::Project;
    use crate::model::skill::Skill;

    fn projects(n: i64) -> Vec<Project> {
        (1..=n)
            .map(|i| Project {
                id: i,
                ..Project::new(format!("Project {}", i), "ongoing", "desc")
            })
            .collect()
    }

    #[test]
    fn search_is_case_insensitive_and_trimmed() {
        let p = Project::new("Portfolio Website", "Completed", "Laravel and Next.js");
        assert!(matches(&p, "  website "));
        assert!(matches(&p, "COMPLETED"));
        assert!(matches(&p, "next.js"));
        assert!(!matches(&p, "mobile"));
        assert!(matches(&p, ""));
    }

    #[test]
    fn skill_search_covers_level() {
        let s = Skill::new("SQL", "Advanced", "2 years");
        assert!(matches(&s, "advanced"));
    }

    #[test]
    fn total_pages_is_at_least_one() {
        assert_eq!(total_pages(0, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(3, 0), 3);
    }

    #[test]
    fn paginate_second_page() {
        let items = projects(12);
        let page = ListQuery {
            page: 2,
            ..ListQuery::new(5)
        }
        .apply(&items);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.offset, 5);
        let ids: Vec<_> = page.items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn out_of_range_page_is_clamped() {
        let items = projects(3);
        let page = ListQuery {
            page: 9,
            ..ListQuery::new(5)
        }
        .apply(&items);
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn sort_by_id_is_display_only() {
        let mut items = projects(3);
        items.swap(0, 2);
        let mut q = ListQuery::new(5);
        q.sort = SortOrder::Id;
        let ids: Vec<_> = q.apply(&items).items.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(items[0].id, 3);
    }

    #[test]
    fn set_search_resets_page() {
        let mut q = ListQuery::new(5);
        q.go_to(3, 4);
        q.set_search("web");
        assert_eq!(q.page, 1);
    }

    #[test]
    fn prev_and_next_stay_in_bounds() {
        let mut q = ListQuery::new(5);
        q.prev_page();
        assert_eq!(q.page, 1);
        q.next_page(2);
        q.next_page(2);
        assert_eq!(q.page, 2);
    }
}
