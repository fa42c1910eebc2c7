use crate::io::remote::{RemoteError, RemoteProjects};
use crate::model::project::Project;
use crate::model::record::RecordId;
use crate::ops::collection_ops::find_record;
use crate::ops::search::ListQuery;
use crate::ops::stats::{ProjectSummary, project_summary};
use crate::view::binding::Notice;

/// The projects table backed by the REST API instead of local storage.
///
/// The snapshot only changes after a call succeeds; a failed call leaves
/// it exactly as it was.
pub struct RemoteProjectsView {
    client: RemoteProjects,
    items: Vec<Project>,
    pub query: ListQuery,
}

impl RemoteProjectsView {
    pub fn new(client: RemoteProjects, per_page: usize) -> Self {
        RemoteProjectsView {
            client,
            items: Vec::new(),
            query: ListQuery::new(per_page),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.items
    }

    pub fn summary(&self) -> ProjectSummary {
        project_summary(&self.items)
    }

    /// Replace the snapshot with the server's list.
    pub fn refresh(&mut self) -> Result<usize, RemoteError> {
        self.items = self.client.list()?;
        Ok(self.items.len())
    }

    /// Create on the server. When the server does not echo the record back,
    /// the list is fetched again to learn its id.
    pub fn add(&mut self, project: Project) -> Result<Notice, RemoteError> {
        match self.client.create(&project)? {
            Some(created) => self.items.push(created),
            None => {
                self.refresh()?;
            }
        }
        Ok(Notice::success::<Project>("added"))
    }

    pub fn update(&mut self, project: Project) -> Result<Notice, RemoteError> {
        let updated = self.client.update(&project)?.unwrap_or(project);
        if let Some(slot) = self.items.iter_mut().find(|p| p.id == updated.id) {
            *slot = updated;
        }
        Ok(Notice::success::<Project>("updated"))
    }

    pub fn remove(&mut self, id: RecordId) -> Result<Notice, RemoteError> {
        self.client.delete(id)?;
        self.items.retain(|p| p.id != id);
        Ok(Notice::success::<Project>("deleted"))
    }

    pub fn find(&self, id: RecordId) -> Option<&Project> {
        find_record(&self.items, id)
    }
}
