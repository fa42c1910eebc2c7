use serde::Serialize;

use crate::model::activity::Activity;
use crate::model::experience::ExperienceEntry;
use crate::model::project::Project;
use crate::model::record::Record;
use crate::model::settings::{ProfileData, SecuritySettings};
use crate::model::skill::Skill;
use crate::ops::search::Page;
use crate::ops::stats::{ExperienceSummary, ProjectSummary, SkillSummary};
use crate::sync::bus::{ChangeEvent, Channel, Payload};
use crate::util::unicode::{display_width, pad_to_width, single_line};
use crate::view::dashboard::DashboardStats;

/// Widest a table column may grow before cells are truncated.
const MAX_COLUMN_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ListJson<'a, T: Serialize, S: Serialize> {
    pub summary: S,
    pub page: usize,
    pub total_pages: usize,
    pub matched: usize,
    pub items: Vec<&'a T>,
}

impl<'a, T: Serialize, S: Serialize> ListJson<'a, T, S> {
    pub fn new(summary: S, page: Page<'a, T>) -> Self {
        ListJson {
            summary,
            page: page.page,
            total_pages: page.total_pages,
            matched: page.matched,
            items: page.items,
        }
    }
}

#[derive(Serialize)]
pub struct MutationJson<'a, T: Serialize> {
    pub message: &'a str,
    pub record: &'a T,
}

#[derive(Serialize)]
pub struct ActivityJson {
    pub message: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Serialize)]
pub struct DashboardJson {
    pub stats: DashboardStats,
    pub recent_activity: Vec<ActivityJson>,
}

#[derive(Serialize)]
pub struct ChangeJson<'a> {
    pub key: &'a str,
    pub channel: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub removed: bool,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn activity_to_json(activity: &Activity) -> ActivityJson {
    ActivityJson {
        message: activity.message.clone(),
        timestamp: activity.timestamp,
        time: activity.local_time().map(|t| t.to_rfc3339()),
    }
}

/// Number of elements a change carries, when it is a collection.
fn change_count(event: &ChangeEvent) -> Option<usize> {
    match &event.payload {
        Payload::Value(v) => v.as_array().map(Vec::len),
        Payload::Serialized(Some(raw)) => serde_json::from_str::<serde_json::Value>(raw)
            .ok()
            .and_then(|v| v.as_array().map(Vec::len)),
        Payload::Serialized(None) => None,
    }
}

pub fn change_to_json(event: &ChangeEvent) -> ChangeJson<'_> {
    ChangeJson {
        key: &event.key,
        channel: match event.channel {
            Channel::Local => "local",
            Channel::CrossContext => "cross-context",
        },
        count: change_count(event),
        removed: event.payload == Payload::Serialized(None),
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// A record that renders as one table row.
pub trait Tabular: Record {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;

    /// `label: value` lines for the detail view.
    fn detail(&self) -> Vec<String> {
        Self::HEADERS
            .iter()
            .zip(self.cells())
            .map(|(h, c)| format!("{}: {}", h.to_lowercase(), c))
            .collect()
    }
}

impl Tabular for Project {
    const HEADERS: &'static [&'static str] = &["ID", "TITLE", "STATUS", "CATEGORY", "DESCRIPTION"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.status.clone(),
            self.category.clone().unwrap_or_default(),
            self.description.clone(),
        ]
    }

    fn detail(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} ({})", self.title, self.id),
            format!("status: {}", self.status),
        ];
        if let Some(category) = &self.category {
            lines.push(format!("category: {}", category));
        }
        if let Some(created) = &self.created_at {
            lines.push(format!("created: {}", created));
        }
        if !self.description.is_empty() {
            lines.push("description:".to_string());
            for line in self.description.lines() {
                lines.push(format!("  {}", line));
            }
        }
        lines
    }
}

impl Tabular for Skill {
    const HEADERS: &'static [&'static str] = &["ID", "NAME", "LEVEL", "EXPERIENCE", "VISIBILITY"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.level.clone(),
            self.experience.clone(),
            self.visibility.to_string(),
        ]
    }
}

impl Tabular for ExperienceEntry {
    const HEADERS: &'static [&'static str] = &["ID", "ROLE", "COMPANY", "TYPE", "DURATION"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.role.clone(),
            self.company.clone(),
            self.kind.clone(),
            self.duration.clone(),
        ]
    }
}

/// Align `rows` under `headers`, two spaces between columns.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> Vec<String> {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.iter().map(|c| single_line(c)).collect())
        .collect();
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .filter_map(|r| r.get(i))
                .map(|c| display_width(c))
                .chain(std::iter::once(display_width(h)))
                .max()
                .unwrap_or(0)
                .min(MAX_COLUMN_WIDTH)
        })
        .collect();

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| pad_to_width(c, *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(headers.to_vec())];
    for row in &rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines
}

/// A page of records as a table, with a footer when there is more than one
/// page or a search narrowed the rows.
pub fn format_page<R: Tabular>(page: &Page<'_, R>, total: usize) -> Vec<String> {
    if page.items.is_empty() {
        return vec![format!("no {}s found", R::KIND)];
    }
    let rows: Vec<Vec<String>> = page.items.iter().map(|r| r.cells()).collect();
    let mut lines = format_table(R::HEADERS, &rows);
    if page.total_pages > 1 || page.matched != total {
        lines.push(format!(
            "page {}/{} ({} of {} shown)",
            page.page,
            page.total_pages,
            page.items.len(),
            page.matched
        ));
    }
    lines
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

pub fn format_project_summary(s: &ProjectSummary) -> String {
    format!(
        "{} projects  {} ongoing  {} completed",
        s.total, s.ongoing, s.completed
    )
}

pub fn format_skill_summary(s: &SkillSummary) -> String {
    format!(
        "{} skills  {} expert  {} years average",
        s.total, s.expert, s.average_years
    )
}

pub fn format_experience_summary(s: &ExperienceSummary) -> String {
    format!(
        "{} entries  current role: {}  {} years",
        s.total, s.current_role, s.years
    )
}

pub fn format_activity_line(activity: &Activity) -> String {
    match activity.local_time() {
        Some(t) => format!("{}  {}", t.format("%Y-%m-%d %H:%M"), activity.message),
        None => activity.message.clone(),
    }
}

pub fn format_dashboard(stats: &DashboardStats, activity: &[Activity]) -> Vec<String> {
    let mut lines = vec![
        format_project_summary(&stats.summary),
        format!(
            "{}% completed  {}% in progress",
            stats.percentages.completed, stats.percentages.in_progress
        ),
        String::new(),
        "by category:".to_string(),
    ];
    for (category, count) in &stats.categories {
        lines.push(format!("  {} {}", pad_to_width(category, 10), count));
    }
    lines.push(String::new());
    lines.push("recent activity:".to_string());
    if activity.is_empty() {
        lines.push("  none yet".to_string());
    }
    for entry in activity {
        lines.push(format!("  {}", format_activity_line(entry)));
    }
    lines
}

pub fn format_security(settings: &SecuritySettings) -> Vec<String> {
    let on_off = |b: bool| if b { "on" } else { "off" };
    let mut lines = vec![
        format!(
            "wallet: {}",
            settings.wallet_address.as_deref().unwrap_or("not connected")
        ),
        format!("two-factor: {}", on_off(settings.two_factor_enabled)),
        format!(
            "password: {}",
            if settings.password_set { "set" } else { "not set" }
        ),
        format!("devices: {}", settings.devices.len()),
    ];
    for device in &settings.devices {
        lines.push(format!("  {}", device.name));
    }
    lines
}

pub fn format_profile(profile: &ProfileData) -> Vec<String> {
    let mut lines = vec![format!("[{}] {}", profile.initials(), profile.name)];
    if !profile.handle.is_empty() {
        lines.push(format!("handle: {}", profile.handle));
    }
    if let Some(nick) = &profile.nickname {
        lines.push(format!("nickname: {}", nick));
    }
    if !profile.bio.is_empty() {
        lines.push(format!("bio: {}", profile.bio));
    }
    lines
}

pub fn format_change(event: &ChangeEvent) -> String {
    let channel = match event.channel {
        Channel::Local => "local",
        Channel::CrossContext => "external",
    };
    match (&event.payload, change_count(event)) {
        (Payload::Serialized(None), _) => format!("{} removed ({})", event.key, channel),
        (_, Some(n)) => format!("{} changed: {} entries ({})", event.key, n, channel),
        (_, None) => format!("{} changed ({})", event.key, channel),
    }
}
