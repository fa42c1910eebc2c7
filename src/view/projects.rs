use crate::model::project::Project;
use crate::ops::stats::{ProjectSummary, project_summary};
use crate::view::list::ListView;

/// The projects table with its summary cards.
pub type ProjectsView = ListView<Project>;

impl ListView<Project> {
    /// Totals over the whole collection, not just the current search.
    pub fn summary(&self) -> ProjectSummary {
        project_summary(self.records())
    }
}
