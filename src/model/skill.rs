use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::record::{Record, RecordId, Stored, ValidationError, require};

/// Whether a skill is shown on the public portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum Visibility {
    #[default]
    Show,
    Hide,
}

impl From<String> for Visibility {
    fn from(s: String) -> Self {
        Visibility::parse(&s).unwrap_or_default()
    }
}

impl Visibility {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "show" => Some(Visibility::Show),
            "hide" => Some(Visibility::Hide),
            _ => None,
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Show => write!(f, "Show"),
            Visibility::Hide => write!(f, "Hide"),
        }
    }
}

/// Skill levels offered by the skill form.
pub const SKILL_LEVELS: [&str; 4] = ["Beginner", "Intermediate", "Advanced", "Expert"];

/// A professional skill, stored under `"skills"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub level: String,
    /// Free text such as "2 years" or "6 months".
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl Skill {
    pub fn new(
        name: impl Into<String>,
        level: impl Into<String>,
        experience: impl Into<String>,
    ) -> Self {
        Skill {
            id: 0,
            name: name.into(),
            level: level.into(),
            experience: experience.into(),
            visibility: Visibility::Show,
        }
    }

    /// The skill set shipped with a freshly seeded store.
    pub fn samples() -> Vec<Skill> {
        [
            ("React", "Advanced", "2 years"),
            ("JavaScript", "Advanced", "3 years"),
            ("CSS", "Intermediate", "2 years"),
            ("Node.js", "Intermediate", "1 year"),
            ("Python", "Beginner", "6 months"),
            ("SQL", "Advanced", "2 years"),
        ]
        .into_iter()
        .zip(1..)
        .map(|((name, level, experience), id)| Skill {
            id,
            ..Skill::new(name, level, experience)
        })
        .collect()
    }
}

impl Stored for Skill {
    const KEY: &'static str = "skills";
    const KEYED: bool = true;
}

impl Record for Skill {
    const KIND: &'static str = "skill";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.level, &self.experience]
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::KIND, "name", &self.name)?;
        require(Self::KIND, "experience", &self.experience)
    }
}
