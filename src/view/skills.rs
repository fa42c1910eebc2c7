use crate::model::skill::Skill;
use crate::ops::stats::{SkillSummary, skill_summary};
use crate::view::list::ListView;

pub type SkillsView = ListView<Skill>;

impl ListView<Skill> {
    pub fn summary(&self) -> SkillSummary {
        skill_summary(self.records())
    }
}
