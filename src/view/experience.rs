use crate::model::experience::ExperienceEntry;
use crate::ops::stats::{ExperienceSummary, experience_summary};
use crate::view::list::ListView;

pub type ExperienceView = ListView<ExperienceEntry>;

impl ListView<ExperienceEntry> {
    pub fn summary(&self) -> ExperienceSummary {
        experience_summary(self.records())
    }
}
