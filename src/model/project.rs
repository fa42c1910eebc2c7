use serde::{Deserialize, Serialize};

use crate::model::record::{Record, RecordId, Stored, ValidationError, require};

/// A portfolio project, stored under `"projects"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub title: String,
    /// Free-form; "ongoing" and "completed" are matched case-insensitively.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Project {
    /// A project without an id yet; one is assigned when it is added.
    pub fn new(
        title: impl Into<String>,
        status: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Project {
            id: 0,
            title: title.into(),
            status: status.into(),
            description: description.into(),
            category: None,
            created_at: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.status.trim().eq_ignore_ascii_case(status)
    }
}

impl Stored for Project {
    const KEY: &'static str = "projects";
    const KEYED: bool = true;

    fn seed() -> Vec<Self> {
        vec![
            Project::new("Portfolio Website", "completed", "").with_category("Web"),
            Project::new("Mobile App", "ongoing", "").with_category("Mobile"),
            Project::new("Blog CMS", "completed", "").with_category("Web"),
            Project::new("Marketing Campaign", "ongoing", "").with_category("Marketing"),
        ]
    }
}

impl Record for Project {
    const KIND: &'static str = "project";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.status, &self.description]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::KIND, "title", &self.title)?;
        require(Self::KIND, "description", &self.description)
    }
}
