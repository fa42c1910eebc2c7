use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;

use crate::model::experience::ExperienceEntry;
use crate::model::project::Project;
use crate::model::skill::Skill;

// Aggregates are recomputed from the full collection on every call and
// never stored.

/// `Math.round` semantics: halves round toward positive infinity.
fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

fn round1(x: f64) -> f64 {
    round_half_up(x * 10.0) / 10.0
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProjectSummary {
    pub total: usize,
    pub ongoing: usize,
    pub completed: usize,
}

pub fn project_summary(projects: &[Project]) -> ProjectSummary {
    ProjectSummary {
        total: projects.len(),
        ongoing: projects.iter().filter(|p| p.has_status("ongoing")).count(),
        completed: projects.iter().filter(|p| p.has_status("completed")).count(),
    }
}

/// Whole-number shares of the total, for the status donuts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusPercentages {
    pub completed: u32,
    pub in_progress: u32,
}

pub fn status_percentages(summary: &ProjectSummary) -> StatusPercentages {
    if summary.total == 0 {
        return StatusPercentages::default();
    }
    let pct = |n: usize| round_half_up(n as f64 / summary.total as f64 * 100.0) as u32;
    StatusPercentages {
        completed: pct(summary.completed),
        in_progress: pct(summary.ongoing),
    }
}

/// Dashboard category buckets, in display order.
pub const CATEGORIES: [&str; 4] = ["Web", "Mobile", "Marketing", "Research"];

/// Map a free-form category onto one of [`CATEGORIES`].
pub fn category_bucket(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "web" | "web development" | "website" => Some("Web"),
        "mobile" | "mobile app" | "app" => Some("Mobile"),
        "marketing" | "marketing campaign" | "campaign" => Some("Marketing"),
        "research" | "study" | "analysis" => Some("Research"),
        _ => None,
    }
}

/// Projects per bucket. Every bucket is present, even at zero; projects
/// with no recognizable category are not counted.
pub fn category_counts(projects: &[Project]) -> IndexMap<&'static str, usize> {
    let mut counts: IndexMap<&'static str, usize> = CATEGORIES.iter().map(|c| (*c, 0)).collect();
    for project in projects {
        if let Some(bucket) = project.category.as_deref().and_then(category_bucket) {
            *counts.entry(bucket).or_insert(0) += 1;
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Skills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub total: usize,
    pub expert: usize,
    /// Mean experience in years, one decimal.
    pub average_years: f64,
}

static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*year").expect("valid regex"));
static MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*month").expect("valid regex"));
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)").expect("valid regex")
});

/// Years of experience in text like "2 years", "1.5 year", "6 months".
/// Falls back to a leading number, then zero.
pub fn experience_years(text: &str) -> f64 {
    let text = text.to_lowercase();
    let capture = |re: &Regex| -> Option<f64> { re.captures(&text)?.get(1)?.as_str().parse().ok() };

    if let Some(years) = capture(&YEARS_RE) {
        return years;
    }
    if let Some(months) = capture(&MONTHS_RE) {
        return months / 12.0;
    }
    capture(&LEADING_NUMBER_RE)
        .filter(|n: &f64| n.is_finite())
        .unwrap_or(0.0)
}

pub fn skill_summary(skills: &[Skill]) -> SkillSummary {
    let total = skills.len();
    let expert = skills
        .iter()
        .filter(|s| s.level.trim().eq_ignore_ascii_case("expert"))
        .count();
    let average_years = if total == 0 {
        0.0
    } else {
        let sum: f64 = skills.iter().map(|s| experience_years(&s.experience)).sum();
        round1(sum / total as f64)
    };
    SkillSummary {
        total,
        expert,
        average_years,
    }
}

// ---------------------------------------------------------------------------
// Experience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceSummary {
    pub total: usize,
    /// Role of the most recently added entry, or "None".
    pub current_role: String,
    /// Sum of all parseable durations in years, one decimal.
    pub years: f64,
}

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// "Mar 2022" -> (2022, 2). Anything else, including "Present", is `None`.
pub fn parse_month_year(s: &str) -> Option<(i64, i64)> {
    let mut parts = s.split(' ');
    let month = parts.next()?;
    let year = parts.next()?.parse::<i64>().ok()?;
    let idx = MONTHS.iter().position(|m| *m == month)?;
    Some((year, idx as i64))
}

/// Months between the two ends of "Mon YYYY - Mon YYYY".
pub fn duration_months(duration: &str) -> Option<i64> {
    let (start, end) = duration.split_once(" - ")?;
    let (sy, sm) = parse_month_year(start)?;
    let (ey, em) = parse_month_year(end)?;
    ey.checked_sub(sy)?.checked_mul(12)?.checked_add(em - sm)
}

pub fn experience_summary(entries: &[ExperienceEntry]) -> ExperienceSummary {
    let months = entries
        .iter()
        .filter_map(|e| duration_months(&e.duration))
        .fold(0i64, i64::saturating_add);
    ExperienceSummary {
        total: entries.len(),
        current_role: entries
            .last()
            .map(|e| e.role.clone())
            .unwrap_or_else(|| "None".to_string()),
        years: if entries.is_empty() {
            0.0
        } else {
            round1(months as f64 / 12.0)
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::record::Stored;
    use pretty_assertions::assert_eq;

    #[test]
    fn summary_matches_status_case_insensitively() {
        let projects = vec![
            Project::new("A", "Ongoing", "x"),
            Project::new("B", "completed", "x"),
            Project::new("C", "COMPLETED", "x"),
            Project::new("D", "paused", "x"),
        ];
        assert_eq!(
            project_summary(&projects),
            ProjectSummary {
                total: 4,
                ongoing: 1,
                completed: 2
            }
        );
    }

    #[test]
    fn percentages_round_to_whole_numbers() {
        let summary = ProjectSummary {
            total: 3,
            ongoing: 1,
            completed: 2,
        };
        assert_eq!(
            status_percentages(&summary),
            StatusPercentages {
                completed: 67,
                in_progress: 33
            }
        );
        assert_eq!(
            status_percentages(&ProjectSummary::default()),
            StatusPercentages::default()
        );
    }

    #[test]
    fn category_aliases() {
        assert_eq!(category_bucket(" Website "), Some("Web"));
        assert_eq!(category_bucket("app"), Some("Mobile"));
        assert_eq!(category_bucket("Campaign"), Some("Marketing"));
        assert_eq!(category_bucket("analysis"), Some("Research"));
        assert_eq!(category_bucket("games"), None);
    }

    #[test]
    fn category_counts_keep_display_order() {
        let projects = Project::seed();
        let counts = category_counts(&projects);
        let pairs: Vec<_> = counts.into_iter().collect();
        assert_eq!(
            pairs,
            vec![("Web", 2), ("Mobile", 1), ("Marketing", 1), ("Research", 0)]
        );
    }

    #[test]
    fn experience_text_parsing() {
        assert_eq!(experience_years("2 years"), 2.0);
        assert_eq!(experience_years("1.5 Years"), 1.5);
        assert_eq!(experience_years("6 months"), 0.5);
        assert_eq!(experience_years("3"), 3.0);
        assert_eq!(experience_years("about a year"), 0.0);
    }

    #[test]
    fn skill_summary_of_samples() {
        let summary = skill_summary(&Skill::samples());
        // (2 + 3 + 2 + 1 + 0.5 + 2) / 6 = 1.75
        assert_eq!(summary.total, 6);
        assert_eq!(summary.expert, 0);
        assert_eq!(summary.average_years, 1.8);
    }

    #[test]
    fn month_year_parsing() {
        assert_eq!(parse_month_year("Jan 2023"), Some((2023, 0)));
        assert_eq!(parse_month_year("Present"), None);
        assert_eq!(parse_month_year("January 2023"), None);
        assert_eq!(duration_months("Jun 2022 - Dec 2022"), Some(6));
        assert_eq!(duration_months("Jan 2023 - Present"), None);
        assert_eq!(
            duration_months("Jan -9223372036854775808 - Jan 9223372036854775807"),
            None
        );
    }

    #[test]
    fn experience_summary_of_samples() {
        let summary = experience_summary(&ExperienceEntry::samples());
        // 6 + 4 + 4 months, the "Present" entry contributes nothing
        assert_eq!(summary.total, 4);
        assert_eq!(summary.current_role, "Freelance Developer");
        assert_eq!(summary.years, 1.2);
    }

    #[test]
    fn empty_experience() {
        let summary = experience_summary(&[]);
        assert_eq!(summary.current_role, "None");
        assert_eq!(summary.years, 0.0);
    }
}
