use serde::{Deserialize, Serialize};

use crate::model::record::{Record, RecordId, Stored, ValidationError, require};

/// Experience types offered by the experience form.
pub const EXPERIENCE_TYPES: [&str; 4] = ["Professional", "Academic", "Internship", "Freelance"];

/// A position held, stored under `"experiences"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    /// "Jan 2023 - May 2023" or "Jan 2023 - Present".
    #[serde(default)]
    pub duration: String,
}

impl ExperienceEntry {
    pub fn new(
        role: impl Into<String>,
        company: impl Into<String>,
        kind: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        ExperienceEntry {
            id: 0,
            role: role.into(),
            company: company.into(),
            kind: kind.into(),
            duration: duration.into(),
        }
    }

    pub fn samples() -> Vec<ExperienceEntry> {
        [
            ("Frontend Developer", "Tech Corp Inc.", "Professional", "Jan 2023 - Present"),
            ("Junior Developer", "Web Solutions Ltd.", "Professional", "Jun 2022 - Dec 2022"),
            ("Intern Developer", "StartUp XYZ", "Internship", "Jan 2022 - May 2022"),
            ("Freelance Developer", "Self-Employed", "Freelance", "Aug 2021 - Dec 2021"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((role, company, kind, duration), id)| ExperienceEntry {
            id,
            ..ExperienceEntry::new(role, company, kind, duration)
        })
        .collect()
    }
}

impl Stored for ExperienceEntry {
    const KEY: &'static str = "experiences";
    const KEYED: bool = true;
}

impl Record for ExperienceEntry {
    const KIND: &'static str = "experience";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.role
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.role, &self.company, &self.kind, &self.duration]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::KIND, "role", &self.role)?;
        require(Self::KIND, "company", &self.company)?;
        require(Self::KIND, "type", &self.kind)?;
        require(Self::KIND, "duration", &self.duration)
    }
}
