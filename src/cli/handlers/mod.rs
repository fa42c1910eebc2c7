mod init;
pub use init::cmd_init;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Serialize;

/// Global override for project directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::project_io::{self, ProjectError};
use crate::io::remote::RemoteProjects;
use crate::io::storage::validate_key;
use crate::io::watcher::StoreWatcher;
use crate::model::activity::Activity;
use crate::model::config::FolioConfig;
use crate::model::experience::{EXPERIENCE_TYPES, ExperienceEntry};
use crate::model::project::Project;
use crate::model::record::{Record, RecordId, Stored};
use crate::model::settings::*;
use crate::model::skill::{SKILL_LEVELS, Skill, Visibility};
use crate::model::workspace::Workspace;
use crate::ops::collection_ops::{RecordError, find_record};
use crate::ops::search::{Page, SortOrder, total_pages};
use crate::store::{CollectionStore, StoreError, now_ms};
use crate::sync::bus::Subscription;
use crate::sync::context::Context;
use crate::view::binding::Notice;
use crate::view::dashboard::DashboardView;
use crate::view::list::ListView;
use crate::view::remote::RemoteProjectsView;

type HandlerResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> HandlerResult {
    let json = cli.json;

    // Store -C override for load_project_cwd()
    if let Some(ref dir) = cli.project_dir {
        let abs = std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        PROJECT_DIR_OVERRIDE
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .replace(abs);
    }

    match cli.command {
        Commands::Init(args) => cmd_init(args, project_dir_override().as_deref()),

        // Collections
        Commands::Projects(cmd) => cmd_projects(cmd, json),
        Commands::Skills(cmd) => cmd_skills(cmd, json),
        Commands::Experience(cmd) => cmd_experience(cmd, json),
        Commands::Dashboard(cmd) => cmd_dashboard(cmd, json),
        Commands::Activity(args) => cmd_activity(args, json),
        Commands::Watch(args) => cmd_watch(args, json),

        // Scalars
        Commands::Settings(cmd) => cmd_settings(cmd, json),
        Commands::Profile(cmd) => cmd_profile(cmd, json),

        // Project files and backend
        Commands::Config(cmd) => cmd_config(cmd, json),
        Commands::Remote(cmd) => cmd_remote(cmd, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn project_dir_override() -> Option<PathBuf> {
    PROJECT_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|p| p.into_inner())
        .clone()
}

/// Load project from -C override or cwd
fn load_project_cwd() -> Result<Workspace, ProjectError> {
    let start = match project_dir_override() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(ProjectError::IoError)?,
    };
    let root = project_io::discover_project(&start)?;
    project_io::load_workspace(&root)
}

/// A context on the project's store that does not listen for other processes.
fn open_context(workspace: &Workspace) -> Result<Context, ProjectError> {
    let storage = project_io::open_storage(workspace)?;
    Ok(Context::isolated(Arc::new(storage))
        .with_seed_defaults(workspace.config.collections.seed_projects))
}

fn print_lines(lines: impl IntoIterator<Item = String>) {
    for line in lines {
        println!("{}", line);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> HandlerResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn trimmed(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn not_found<R: Record>(id: RecordId) -> RecordError {
    RecordError::NotFound { kind: R::KIND, id }
}

// ---------------------------------------------------------------------------
// Shared record commands
// ---------------------------------------------------------------------------

fn print_page<R: Tabular, S: Serialize>(
    summary: S,
    summary_line: String,
    page: Page<'_, R>,
    total: usize,
    json: bool,
) -> HandlerResult {
    if json {
        return print_json(&ListJson::new(summary, page));
    }
    println!("{}", summary_line);
    println!();
    print_lines(format_page(&page, total));
    Ok(())
}

fn print_mutation<R: Tabular>(notice: &Notice, record: &R, json: bool) -> HandlerResult {
    if json {
        return print_json(&MutationJson {
            message: &notice.message,
            record,
        });
    }
    println!("{}", notice);
    print_lines(record.detail().into_iter().map(|l| format!("  {}", l)));
    Ok(())
}

fn list_records<R: Tabular, S: Serialize>(
    store: &CollectionStore,
    per_page: usize,
    args: ListArgs,
    json: bool,
    summarize: impl Fn(&ListView<R>) -> (S, String),
) -> HandlerResult {
    let per_page = if args.all { usize::MAX } else { per_page };
    let mut view = ListView::<R>::activate(store, per_page)?;
    if args.sort_by_id {
        view.set_sort(SortOrder::Id);
    }
    if let Some(search) = args.search {
        view.set_search(search);
    }
    if let Some(page) = args.page {
        view.go_to_page(page);
    }
    let (summary, line) = summarize(&view);
    print_page(summary, line, view.page(), view.records().len(), json)
}

fn show_record<R: Tabular>(store: &CollectionStore, id: RecordId, json: bool) -> HandlerResult {
    let records = store.load::<R>()?;
    let record = find_record(&records, id).ok_or_else(|| not_found::<R>(id))?;
    if json {
        return print_json(record);
    }
    print_lines(record.detail());
    Ok(())
}

fn add_record<R: Tabular>(
    store: &CollectionStore,
    per_page: usize,
    record: R,
    json: bool,
) -> HandlerResult {
    let mut view = ListView::<R>::activate(store, per_page)?;
    let (added, notice) = view.add(record)?;
    print_mutation(&notice, &added, json)
}

fn update_record<R: Tabular>(
    store: &CollectionStore,
    per_page: usize,
    id: RecordId,
    json: bool,
    patch: impl FnOnce(&mut R),
) -> HandlerResult {
    let mut view = ListView::<R>::activate(store, per_page)?;
    let mut record = view.find(id).cloned().ok_or_else(|| not_found::<R>(id))?;
    patch(&mut record);
    let notice = view.update(record.clone())?;
    print_mutation(&notice, &record, json)
}

fn delete_record<R: Tabular>(
    store: &CollectionStore,
    per_page: usize,
    id: RecordId,
    json: bool,
) -> HandlerResult {
    let mut view = ListView::<R>::activate(store, per_page)?;
    let (removed, notice) = view.remove(id)?;
    print_mutation(&notice, &removed, json)
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

fn project_from(fields: ProjectFields) -> Project {
    let status = non_empty(fields.status).unwrap_or_else(|| "ongoing".to_string());
    Project {
        category: non_empty(fields.category),
        ..Project::new(trimmed(fields.title), status, trimmed(fields.description))
    }
}

fn patch_project(project: &mut Project, fields: ProjectFields) {
    if let Some(title) = fields.title {
        project.title = title.trim().to_string();
    }
    if let Some(status) = fields.status {
        project.status = status.trim().to_string();
    }
    if let Some(description) = fields.description {
        project.description = description.trim().to_string();
    }
    if fields.category.is_some() {
        project.category = non_empty(fields.category);
    }
}

fn cmd_projects(cmd: ProjectsCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let per_page = workspace.config.ui.rows_per_page;

    match cmd
        .action
        .unwrap_or_else(|| ProjectsAction::List(ListArgs::default()))
    {
        ProjectsAction::List(args) => {
            list_records(ctx.store(), per_page, args, json, |view: &ListView<Project>| {
                let summary = view.summary();
                (summary, format_project_summary(&summary))
            })
        }
        ProjectsAction::Show(arg) => show_record::<Project>(ctx.store(), arg.id, json),
        ProjectsAction::Add(fields) => {
            add_record(ctx.store(), per_page, project_from(fields), json)
        }
        ProjectsAction::Update(args) => {
            update_record(ctx.store(), per_page, args.id, json, |p: &mut Project| {
                patch_project(p, args.fields)
            })
        }
        ProjectsAction::Delete(arg) => delete_record::<Project>(ctx.store(), per_page, arg.id, json),
    }
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

fn visibility(arg: VisibilityArg) -> Visibility {
    match arg {
        VisibilityArg::Show => Visibility::Show,
        VisibilityArg::Hide => Visibility::Hide,
    }
}

fn skill_from(fields: SkillFields) -> Skill {
    let level = non_empty(fields.level).unwrap_or_else(|| SKILL_LEVELS[0].to_string());
    Skill {
        visibility: fields.visibility.map(visibility).unwrap_or_default(),
        ..Skill::new(trimmed(fields.name), level, trimmed(fields.experience))
    }
}

fn patch_skill(skill: &mut Skill, fields: SkillFields) {
    if let Some(name) = fields.name {
        skill.name = name.trim().to_string();
    }
    if let Some(level) = fields.level {
        skill.level = level.trim().to_string();
    }
    if let Some(experience) = fields.experience {
        skill.experience = experience.trim().to_string();
    }
    if let Some(v) = fields.visibility {
        skill.visibility = visibility(v);
    }
}

fn cmd_skills(cmd: SkillsCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let per_page = workspace.config.ui.rows_per_page;

    match cmd
        .action
        .unwrap_or_else(|| SkillsAction::List(ListArgs::default()))
    {
        SkillsAction::List(args) => {
            list_records(ctx.store(), per_page, args, json, |view: &ListView<Skill>| {
                let summary = view.summary();
                let line = format_skill_summary(&summary);
                (summary, line)
            })
        }
        SkillsAction::Show(arg) => show_record::<Skill>(ctx.store(), arg.id, json),
        SkillsAction::Add(fields) => add_record(ctx.store(), per_page, skill_from(fields), json),
        SkillsAction::Update(args) => {
            update_record(ctx.store(), per_page, args.id, json, |s: &mut Skill| {
                patch_skill(s, args.fields)
            })
        }
        SkillsAction::Delete(arg) => delete_record::<Skill>(ctx.store(), per_page, arg.id, json),
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

fn experience_from(fields: ExperienceFields) -> ExperienceEntry {
    let kind = non_empty(fields.kind).unwrap_or_else(|| EXPERIENCE_TYPES[0].to_string());
    ExperienceEntry::new(
        trimmed(fields.role),
        trimmed(fields.company),
        kind,
        trimmed(fields.duration),
    )
}

fn patch_experience(entry: &mut ExperienceEntry, fields: ExperienceFields) {
    if let Some(role) = fields.role {
        entry.role = role.trim().to_string();
    }
    if let Some(company) = fields.company {
        entry.company = company.trim().to_string();
    }
    if let Some(kind) = fields.kind {
        entry.kind = kind.trim().to_string();
    }
    if let Some(duration) = fields.duration {
        entry.duration = duration.trim().to_string();
    }
}

fn cmd_experience(cmd: ExperienceCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let per_page = workspace.config.ui.rows_per_page;

    match cmd
        .action
        .unwrap_or_else(|| ExperienceAction::List(ListArgs::default()))
    {
        ExperienceAction::List(args) => list_records(
            ctx.store(),
            per_page,
            args,
            json,
            |view: &ListView<ExperienceEntry>| {
                let summary = view.summary();
                let line = format_experience_summary(&summary);
                (summary, line)
            },
        ),
        ExperienceAction::Show(arg) => show_record::<ExperienceEntry>(ctx.store(), arg.id, json),
        ExperienceAction::Add(fields) => {
            add_record(ctx.store(), per_page, experience_from(fields), json)
        }
        ExperienceAction::Update(args) => update_record(
            ctx.store(),
            per_page,
            args.id,
            json,
            |e: &mut ExperienceEntry| patch_experience(e, args.fields),
        ),
        ExperienceAction::Delete(arg) => {
            delete_record::<ExperienceEntry>(ctx.store(), per_page, arg.id, json)
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard, activity, watch
// ---------------------------------------------------------------------------

fn cmd_dashboard(cmd: DashboardCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let mut view = DashboardView::activate(ctx.store())?;

    match cmd.action.unwrap_or(DashboardAction::Show) {
        DashboardAction::Show => {
            let stats = view.stats();
            if json {
                return print_json(&DashboardJson {
                    stats,
                    recent_activity: view.recent_activity().iter().map(activity_to_json).collect(),
                });
            }
            println!("{}", workspace.config.store.name);
            println!();
            print_lines(format_dashboard(&stats, view.recent_activity()));
            Ok(())
        }
        DashboardAction::Add(fields) => {
            // Defaults are filled in by the dashboard, not here.
            let draft = Project {
                category: non_empty(fields.category),
                ..Project::new(
                    trimmed(fields.title),
                    trimmed(fields.status),
                    trimmed(fields.description),
                )
            };
            let (added, notice) = view.add_project(draft)?;
            print_mutation(&notice, &added, json)
        }
    }
}

fn cmd_activity(args: ActivityArgs, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let log = ctx.store().load::<Activity>()?;
    let limit = args.limit.unwrap_or(log.len());
    let entries = &log[..limit.min(log.len())];

    if json {
        let out: Vec<ActivityJson> = entries.iter().map(activity_to_json).collect();
        return print_json(&out);
    }
    if entries.is_empty() {
        println!("no activity yet");
    }
    print_lines(entries.iter().map(format_activity_line));
    Ok(())
}

fn default_watch_keys() -> Vec<String> {
    [
        Project::KEY,
        Skill::KEY,
        ExperienceEntry::KEY,
        Activity::KEY,
    ]
    .iter()
    .map(|k| k.to_string())
    .collect()
}

fn cmd_watch(args: WatchArgs, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let keys = if args.keys.is_empty() {
        default_watch_keys()
    } else {
        args.keys
    };
    for key in &keys {
        validate_key(key)?;
    }

    let storage = project_io::open_storage(&workspace)?;
    let watcher = StoreWatcher::start(&storage)?;
    let ctx = Context::new(Arc::new(storage), Box::new(watcher));
    let subscriptions: Vec<Subscription> = keys.iter().map(|k| ctx.bus().subscribe(k)).collect();
    let interval = Duration::from_millis(workspace.config.ui.watch_interval_ms.max(1));

    eprintln!("watching {} (ctrl-c to stop)", keys.join(", "));
    tracing::debug!(keys = ?keys, interval_ms = interval.as_millis() as u64, "watch started");

    let mut seen = 0;
    loop {
        if args.count.is_some_and(|n| seen >= n) {
            return Ok(());
        }
        ctx.pump();
        for event in subscriptions.iter().flat_map(Subscription::poll) {
            if json {
                println!("{}", serde_json::to_string(&change_to_json(&event))?);
            } else {
                println!("{}", format_change(&event));
            }
            seen += 1;
            if args.count.is_some_and(|n| seen >= n) {
                return Ok(());
            }
        }
        std::thread::sleep(interval);
    }
}

// ---------------------------------------------------------------------------
// Settings and profile
// ---------------------------------------------------------------------------

/// Assemble the security settings from their individual keys.
fn load_security(store: &CollectionStore) -> Result<SecuritySettings, StoreError> {
    let defaults = SecuritySettings::default();
    Ok(SecuritySettings {
        wallet_address: store
            .load_setting::<Option<String>>(WALLET_ADDRESS_KEY)?
            .flatten(),
        two_factor_enabled: store
            .load_setting(TWO_FACTOR_KEY)?
            .unwrap_or(defaults.two_factor_enabled),
        password_set: store
            .load_setting(PASSWORD_SET_KEY)?
            .unwrap_or(defaults.password_set),
        devices: store.load_setting(DEVICES_KEY)?.unwrap_or(defaults.devices),
    })
}

fn cmd_settings(cmd: SettingsCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let store = ctx.store();
    let mut settings = load_security(store)?;

    let message = match cmd.action.unwrap_or(SettingsAction::Show) {
        SettingsAction::Show => None,
        SettingsAction::TwoFactor(args) => {
            settings.two_factor_enabled = args.state == Toggle::On;
            store.save_setting(TWO_FACTOR_KEY, &settings.two_factor_enabled)?;
            Some(if settings.two_factor_enabled {
                "Two-factor authentication enabled"
            } else {
                "Two-factor authentication disabled"
            })
        }
        SettingsAction::Wallet(args) => {
            if args.clear {
                settings.wallet_address = None;
            } else {
                let address = non_empty(args.address)
                    .ok_or("wallet address required (or pass --clear)")?;
                settings.wallet_address = Some(address);
            }
            store.save_setting(WALLET_ADDRESS_KEY, &settings.wallet_address)?;
            Some(if settings.wallet_address.is_some() {
                "Wallet connected"
            } else {
                "Wallet disconnected"
            })
        }
        SettingsAction::Password => {
            settings.password_set = true;
            store.save_setting(PASSWORD_SET_KEY, &true)?;
            Some("Password updated")
        }
        SettingsAction::Device(cmd) => match cmd.action {
            DeviceAction::Add(arg) => {
                let name = arg.name.trim().to_string();
                if name.is_empty() {
                    return Err("device name required".into());
                }
                if settings.devices.iter().any(|d| d.name == name) {
                    return Err(format!("device '{}' is already authorized", name).into());
                }
                settings.devices.push(Device {
                    name,
                    last_active: Some(now_ms()),
                });
                store.save_setting(DEVICES_KEY, &settings.devices)?;
                Some("Device authorized")
            }
            DeviceAction::Remove(arg) => {
                let before = settings.devices.len();
                settings.devices.retain(|d| d.name != arg.name.trim());
                if settings.devices.len() == before {
                    return Err(format!("no device named '{}'", arg.name.trim()).into());
                }
                store.save_setting(DEVICES_KEY, &settings.devices)?;
                Some("Device removed")
            }
        },
    };

    if json {
        return print_json(&settings);
    }
    if let Some(message) = message {
        println!("{}", message);
    }
    print_lines(format_security(&settings));
    Ok(())
}

fn cmd_profile(cmd: ProfileCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let ctx = open_context(&workspace)?;
    let store = ctx.store();
    let mut profile: ProfileData = store.load_setting(PROFILE_DATA_KEY)?.unwrap_or_default();

    if let Some(ProfileAction::Set(args)) = cmd.action {
        if let Some(name) = args.name {
            profile.name = name.trim().to_string();
        }
        if let Some(handle) = args.handle {
            profile.handle = handle.trim().to_string();
        }
        if let Some(bio) = args.bio {
            profile.bio = bio.trim().to_string();
        }
        if args.nickname.is_some() {
            profile.nickname = non_empty(args.nickname);
        }
        store.save_setting(PROFILE_DATA_KEY, &profile)?;
        if !json {
            println!("Profile updated");
        }
    }

    if json {
        return print_json(&profile);
    }
    print_lines(format_profile(&profile));
    Ok(())
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(cmd: ConfigCmd, json: bool) -> HandlerResult {
    let workspace = load_project_cwd()?;
    let (_, mut doc) = config_io::read_config(&workspace.folio_dir)?;

    match cmd.action {
        ConfigAction::Get(args) => {
            let value = config_io::get_value(&doc, &args.key)
                .ok_or_else(|| format!("no value for '{}' in folio.toml", args.key))?;
            if json {
                return print_json(&serde_json::json!({ "key": args.key, "value": value }));
            }
            println!("{}", value);
        }
        ConfigAction::Set(args) => {
            config_io::set_value(&mut doc, &args.key, &args.value);
            // Refuse edits that would leave folio.toml unreadable.
            toml::from_str::<FolioConfig>(&doc.to_string()).map_err(ProjectError::from)?;
            config_io::write_config(&workspace.folio_dir, &doc)?;
            if json {
                return print_json(&serde_json::json!({ "key": args.key, "value": args.value }));
            }
            println!("{} = {}", args.key, args.value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

fn cmd_remote(cmd: RemoteCmd, json: bool) -> HandlerResult {
    // With --url the backend is usable outside a project.
    let config = match load_project_cwd() {
        Ok(workspace) => Some(workspace.config),
        Err(ProjectError::NotAProject) if cmd.url.is_some() => None,
        Err(e) => return Err(e.into()),
    };
    let remote = config.as_ref().map(|c| c.remote.clone()).unwrap_or_default();
    let per_page = config
        .as_ref()
        .map(|c| c.ui.rows_per_page)
        .unwrap_or_else(|| crate::model::config::UiConfig::default().rows_per_page);

    let base_url = cmd
        .url
        .or(remote.base_url)
        .ok_or("no backend configured: set remote.base_url in folio.toml or pass --url")?;
    let client = RemoteProjects::new(&base_url, Duration::from_secs(remote.timeout_secs));

    match cmd
        .action
        .unwrap_or_else(|| RemoteAction::List(ListArgs::default()))
    {
        RemoteAction::List(args) => {
            let per_page = if args.all { usize::MAX } else { per_page };
            let mut view = RemoteProjectsView::new(client, per_page);
            view.refresh()?;
            if args.sort_by_id {
                view.query.sort = SortOrder::Id;
            }
            if let Some(search) = args.search {
                view.query.set_search(search);
            }
            if let Some(page) = args.page {
                let pages = total_pages(view.projects().len(), view.query.per_page);
                view.query.go_to(page, pages);
            }
            let summary = view.summary();
            print_page(
                summary,
                format_project_summary(&summary),
                view.query.apply(view.projects()),
                view.projects().len(),
                json,
            )
        }
        RemoteAction::Add(fields) => {
            let project = project_from(fields);
            project.validate()?;
            let mut view = RemoteProjectsView::new(client, per_page);
            let notice = view.add(project.clone())?;
            let added = view.projects().last().unwrap_or(&project);
            print_mutation(&notice, added, json)
        }
        RemoteAction::Update(args) => {
            let mut view = RemoteProjectsView::new(client, per_page);
            view.refresh()?;
            let mut project = view
                .find(args.id)
                .cloned()
                .ok_or_else(|| not_found::<Project>(args.id))?;
            patch_project(&mut project, args.fields);
            project.validate()?;
            let notice = view.update(project.clone())?;
            let updated = view.find(args.id).unwrap_or(&project);
            print_mutation(&notice, updated, json)
        }
        RemoteAction::Delete(arg) => {
            let mut view = RemoteProjectsView::new(client, per_page);
            let notice = view.remove(arg.id)?;
            if json {
                return print_json(&serde_json::json!({ "message": notice.message, "id": arg.id }));
            }
            println!("{}", notice);
            Ok(())
        }
    }
}
