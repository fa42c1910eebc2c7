use indexmap::IndexMap;
use serde::Serialize;

use crate::model::activity::Activity;
use crate::model::project::Project;
use crate::model::record::Record;
use crate::ops::stats::{
    ProjectSummary, StatusPercentages, category_counts, project_summary, status_percentages,
};
use crate::store::{CollectionStore, StoreError};
use crate::view::binding::{Notice, ViewBinding};

/// Everything the dashboard cards show, derived from the projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub summary: ProjectSummary,
    pub percentages: StatusPercentages,
    pub categories: IndexMap<&'static str, usize>,
}

/// Clean up a project entered from the dashboard's quick-add form.
///
/// Missing title becomes "Untitled", a blank category "Web". Status is
/// lower-cased when it names a known state and defaults to "ongoing".
pub fn normalize_draft(mut project: Project) -> Project {
    if project.title.is_empty() {
        project.title = "Untitled".to_string();
    }
    let lower = project.status.to_lowercase();
    if lower == "ongoing" || lower == "completed" {
        project.status = lower;
    } else if project.status.is_empty() {
        project.status = "ongoing".to_string();
    }
    if project.category.as_deref().is_none_or(str::is_empty) {
        project.category = Some("Web".to_string());
    }
    project
}

/// Project statistics plus the recent-activity feed.
pub struct DashboardView {
    projects: ViewBinding<Project>,
    activity: ViewBinding<Activity>,
}

impl DashboardView {
    pub fn activate(store: &CollectionStore) -> Result<Self, StoreError> {
        Ok(DashboardView {
            projects: ViewBinding::activate(store)?,
            activity: ViewBinding::activate(store)?,
        })
    }

    pub fn sync(&mut self) -> usize {
        self.projects.sync() + self.activity.sync()
    }

    pub fn projects(&self) -> &[Project] {
        self.projects.items()
    }

    /// Newest first, at most ten entries.
    pub fn recent_activity(&self) -> &[Activity] {
        self.activity.items()
    }

    pub fn stats(&self) -> DashboardStats {
        let summary = project_summary(self.projects());
        DashboardStats {
            summary,
            percentages: status_percentages(&summary),
            categories: category_counts(self.projects()),
        }
    }

    /// Validate the form input, normalize it, and add it.
    pub fn add_project(&mut self, draft: Project) -> Result<(Project, Notice), StoreError> {
        draft.validate()?;
        let added = self.projects.add(normalize_draft(draft))?;
        self.activity.sync();
        Ok(added)
    }
}
