pub mod binding;
pub mod dashboard;
pub mod experience;
pub mod list;
pub mod projects;
pub mod remote;
pub mod skills;

pub use binding::{Notice, ViewBinding};
pub use dashboard::DashboardView;
pub use experience::ExperienceView;
pub use list::ListView;
pub use projects::ProjectsView;
pub use remote::RemoteProjectsView;
pub use skills::SkillsView;
