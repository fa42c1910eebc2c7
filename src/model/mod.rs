pub mod activity;
pub mod config;
pub mod experience;
pub mod project;
pub mod record;
pub mod settings;
pub mod skill;
pub mod workspace;

pub use activity::*;
pub use config::*;
pub use experience::*;
pub use project::*;
pub use record::*;
pub use settings::*;
pub use skill::*;
pub use workspace::*;
