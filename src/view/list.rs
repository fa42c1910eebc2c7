use crate::model::record::{Record, RecordId};
use crate::ops::search::{ListQuery, Page, SortOrder, total_pages};
use crate::store::{CollectionStore, StoreError};
use crate::view::binding::{Notice, ViewBinding};

/// A searchable, paginated table over one collection.
pub struct ListView<R: Record> {
    binding: ViewBinding<R>,
    query: ListQuery,
}

impl<R: Record> ListView<R> {
    pub fn activate(store: &CollectionStore, per_page: usize) -> Result<Self, StoreError> {
        Ok(ListView {
            binding: ViewBinding::activate(store)?,
            query: ListQuery::new(per_page),
        })
    }

    pub fn records(&self) -> &[R] {
        self.binding.items()
    }

    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.binding.find(id)
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.set_search(search);
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.query.sort = sort;
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.query.go_to(page, self.total_pages());
    }

    /// Pages in the whole collection, ignoring the search.
    pub fn total_pages(&self) -> usize {
        total_pages(self.records().len(), self.query.per_page)
    }

    /// The rows currently on screen.
    pub fn page(&self) -> Page<'_, R> {
        self.query.apply(self.records())
    }

    /// Apply pending change notifications and keep the page in range.
    pub fn sync(&mut self) -> usize {
        let applied = self.binding.sync();
        if applied > 0 {
            self.clamp_page();
        }
        applied
    }

    /// Add a record and jump to the last page, where it appears.
    pub fn add(&mut self, record: R) -> Result<(R, Notice), StoreError> {
        let added = self.binding.add(record)?;
        self.query.page = self.total_pages();
        Ok(added)
    }

    pub fn update(&mut self, record: R) -> Result<Notice, StoreError> {
        self.binding.update(record)
    }

    pub fn remove(&mut self, id: RecordId) -> Result<(R, Notice), StoreError> {
        let removed = self.binding.remove(id)?;
        self.clamp_page();
        Ok(removed)
    }

    fn clamp_page(&mut self) {
        let pages = self.total_pages();
        self.query.go_to(self.query.page, pages);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::io::memory::MemoryOrigin;
    use crate::model::project::Project;
    use crate::sync::bus::ChangeBus;

    fn store() -> CollectionStore {
        let (storage, _) = MemoryOrigin::new().open_context();
        CollectionStore::new(Arc::new(storage), ChangeBus::new())
    }

    fn fill(view: &mut ListView<Project>, n: usize) {
        for i in 0..n {
            view.add(Project::new(format!("P{}", i), "ongoing", "x"))
                .unwrap();
        }
    }

    #[test]
    fn add_jumps_to_last_page() {
        let mut view = ListView::<Project>::activate(&store(), 5).unwrap();
        fill(&mut view, 6);
        assert_eq!(view.query().page, 2);
        let page = view.page();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].title, "P5");
    }

    #[test]
    fn remove_clamps_page() {
        let mut view = ListView::<Project>::activate(&store(), 5).unwrap();
        fill(&mut view, 6);
        let last = view.records()[5].id;
        view.remove(last).unwrap();
        assert_eq!(view.query().page, 1);
    }

    #[test]
    fn search_restarts_at_first_page() {
        let mut view = ListView::<Project>::activate(&store(), 2).unwrap();
        fill(&mut view, 5);
        view.set_search("p4");
        assert_eq!(view.query().page, 1);
        let page = view.page();
        assert_eq!(page.matched, 1);
        assert_eq!(page.items[0].title, "P4");
    }

    #[test]
    fn shrink_from_elsewhere_clamps_on_sync() {
        let store = store();
        let mut view = ListView::<Project>::activate(&store, 2).unwrap();
        fill(&mut view, 5);
        assert_eq!(view.query().page, 3);

        store.commit::<Project>(&view.records()[..1]).unwrap();
        view.sync();
        assert_eq!(view.query().page, 1);
        assert_eq!(view.records().len(), 1);
    }
}
