use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "folio", about = concat!("folio v", env!("CARGO_PKG_VERSION"), " - your portfolio content, kept locally"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new folio project in the current directory
    Init(InitArgs),
    /// List, show, add, update, or delete projects
    Projects(ProjectsCmd),
    /// List, show, add, update, or delete skills
    Skills(SkillsCmd),
    /// List, show, add, update, or delete experience entries
    Experience(ExperienceCmd),
    /// Show project statistics and recent activity, or quick-add a project
    Dashboard(DashboardCmd),
    /// Show the recent activity log
    Activity(ActivityArgs),
    /// Print changes made by other processes as they happen
    Watch(WatchArgs),
    /// Account security settings
    Settings(SettingsCmd),
    /// Public profile
    Profile(ProfileCmd),
    /// Read or edit folio.toml
    Config(ConfigCmd),
    /// Projects on the REST backend
    Remote(RemoteCmd),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Store name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Populate projects, skills, and experience with sample content
    #[arg(long)]
    pub seed: bool,
    /// Reinitialize even if folio/ already exists
    #[arg(long)]
    pub force: bool,
}

// ---------------------------------------------------------------------------
// Shared record args
// ---------------------------------------------------------------------------

#[derive(Args, Default)]
pub struct ListArgs {
    /// Case-insensitive substring filter
    #[arg(long, short)]
    pub search: Option<String>,
    /// Page to show (1-based, clamped)
    #[arg(long)]
    pub page: Option<usize>,
    /// Show every row instead of one page
    #[arg(long, conflicts_with = "page")]
    pub all: bool,
    /// Order rows by id instead of insertion order
    #[arg(long)]
    pub sort_by_id: bool,
}

#[derive(Args)]
pub struct IdArg {
    /// Record id
    pub id: i64,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectsCmd {
    #[command(subcommand)]
    pub action: Option<ProjectsAction>,
}

#[derive(Subcommand)]
pub enum ProjectsAction {
    /// List projects (default)
    List(ListArgs),
    /// Show one project
    Show(IdArg),
    /// Add a project
    Add(ProjectFields),
    /// Change fields of a project
    Update(ProjectUpdateArgs),
    /// Delete a project
    Delete(IdArg),
}

#[derive(Args, Clone, Default)]
pub struct ProjectFields {
    #[arg(long)]
    pub title: Option<String>,
    /// Free-form; "ongoing" and "completed" feed the statistics
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, short)]
    pub description: Option<String>,
    /// Web, Mobile, Marketing, Research, or an alias of one
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct ProjectUpdateArgs {
    /// Project id
    pub id: i64,
    #[command(flatten)]
    pub fields: ProjectFields,
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SkillsCmd {
    #[command(subcommand)]
    pub action: Option<SkillsAction>,
}

#[derive(Subcommand)]
pub enum SkillsAction {
    /// List skills (default)
    List(ListArgs),
    /// Show one skill
    Show(IdArg),
    /// Add a skill
    Add(SkillFields),
    /// Change fields of a skill
    Update(SkillUpdateArgs),
    /// Delete a skill
    Delete(IdArg),
}

#[derive(Args, Clone, Default)]
pub struct SkillFields {
    #[arg(long)]
    pub name: Option<String>,
    /// Beginner, Intermediate, Advanced, or Expert
    #[arg(long)]
    pub level: Option<String>,
    /// e.g. "2 years" or "6 months"
    #[arg(long)]
    pub experience: Option<String>,
    #[arg(long, value_enum)]
    pub visibility: Option<VisibilityArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum VisibilityArg {
    Show,
    Hide,
}

#[derive(Args)]
pub struct SkillUpdateArgs {
    /// Skill id
    pub id: i64,
    #[command(flatten)]
    pub fields: SkillFields,
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExperienceCmd {
    #[command(subcommand)]
    pub action: Option<ExperienceAction>,
}

#[derive(Subcommand)]
pub enum ExperienceAction {
    /// List experience entries (default)
    List(ListArgs),
    /// Show one entry
    Show(IdArg),
    /// Add an entry
    Add(ExperienceFields),
    /// Change fields of an entry
    Update(ExperienceUpdateArgs),
    /// Delete an entry
    Delete(IdArg),
}

#[derive(Args, Clone, Default)]
pub struct ExperienceFields {
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub company: Option<String>,
    /// Professional, Academic, Internship, or Freelance
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: Option<String>,
    /// "Mon YYYY - Mon YYYY" or "Mon YYYY - Present"
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args)]
pub struct ExperienceUpdateArgs {
    /// Entry id
    pub id: i64,
    #[command(flatten)]
    pub fields: ExperienceFields,
}

// ---------------------------------------------------------------------------
// Dashboard, activity, watch
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct DashboardCmd {
    #[command(subcommand)]
    pub action: Option<DashboardAction>,
}

#[derive(Subcommand)]
pub enum DashboardAction {
    /// Show statistics and recent activity (default)
    Show,
    /// Quick-add a project with dashboard defaults
    Add(ProjectFields),
}

#[derive(Args)]
pub struct ActivityArgs {
    /// Maximum number of entries to show (default: all, at most 10)
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Keys to watch (default: projects, skills, experiences, recentActivity)
    pub keys: Vec<String>,
    /// Exit after this many changes
    #[arg(long)]
    pub count: Option<usize>,
}

// ---------------------------------------------------------------------------
// Settings and profile
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct SettingsCmd {
    #[command(subcommand)]
    pub action: Option<SettingsAction>,
}

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show security settings (default)
    Show,
    /// Turn two-factor authentication on or off
    TwoFactor(TwoFactorArgs),
    /// Set or clear the login wallet address
    Wallet(WalletArgs),
    /// Mark the account password as set
    Password,
    /// Manage authorized devices
    Device(DeviceCmd),
}

#[derive(Args)]
pub struct TwoFactorArgs {
    #[arg(value_enum)]
    pub state: Toggle,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[derive(Args)]
pub struct WalletArgs {
    /// Wallet address (omit with --clear)
    pub address: Option<String>,
    /// Remove the wallet address
    #[arg(long, conflicts_with = "address")]
    pub clear: bool,
}

#[derive(Args)]
pub struct DeviceCmd {
    #[command(subcommand)]
    pub action: DeviceAction,
}

#[derive(Subcommand)]
pub enum DeviceAction {
    /// Authorize a device
    Add(DeviceNameArg),
    /// Revoke a device
    Remove(DeviceNameArg),
}

#[derive(Args)]
pub struct DeviceNameArg {
    /// Device name
    pub name: String,
}

#[derive(Args)]
pub struct ProfileCmd {
    #[command(subcommand)]
    pub action: Option<ProfileAction>,
}

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile (default)
    Show,
    /// Change profile fields
    Set(ProfileSetArgs),
}

#[derive(Args)]
pub struct ProfileSetArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub handle: Option<String>,
    #[arg(long)]
    pub bio: Option<String>,
    #[arg(long)]
    pub nickname: Option<String>,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a value, e.g. `ui.rows_per_page`
    Get(ConfigGetArgs),
    /// Set a value, keeping comments and layout
    Set(ConfigSetArgs),
}

#[derive(Args)]
pub struct ConfigGetArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    pub key: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RemoteCmd {
    #[command(subcommand)]
    pub action: Option<RemoteAction>,
    /// Backend base URL (default: [remote] base_url in folio.toml)
    #[arg(long, global = true)]
    pub url: Option<String>,
}

#[derive(Subcommand)]
pub enum RemoteAction {
    /// List projects on the backend (default)
    List(ListArgs),
    /// Create a project on the backend
    Add(ProjectFields),
    /// Change fields of a backend project
    Update(ProjectUpdateArgs),
    /// Delete a backend project
    Delete(IdArg),
}
