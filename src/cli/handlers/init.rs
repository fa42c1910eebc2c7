use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::cli::commands::InitArgs;
use crate::io::file_storage::{FileStorage, atomic_write};
use crate::io::project_io;
use crate::model::experience::ExperienceEntry;
use crate::model::project::Project;
use crate::model::record::Stored;
use crate::model::skill::Skill;
use crate::model::workspace::{CONFIG_FILE, FOLIO_DIR, STORE_DIR};
use crate::store::{CollectionStore, now_ms};
use crate::sync::bus::ChangeBus;

const FOLIO_TOML_TEMPLATE: &str = r##"[store]
name = "{name}"

[collections]
# Fill an absent projects collection with four sample projects on first load.
seed_projects = false

[ui]
rows_per_page = 5
# How often `folio watch` checks for changes from other processes.
watch_interval_ms = 200

# --- Remote backend ---
# Base URL of the REST API used by `folio remote`.
#
# [remote]
# base_url = "https://api.example.com/api"
# timeout_secs = 30
"##;

/// Infer a store name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_folio_toml(name: &str) -> String {
    FOLIO_TOML_TEMPLATE.replace("{name}", &name.replace('"', "\\\""))
}

/// Write the sample projects, skills, and experience into the store.
fn write_samples(storage: FileStorage) -> Result<(usize, usize, usize), Box<dyn std::error::Error>> {
    let store = CollectionStore::new(Arc::new(storage), ChangeBus::new());

    let base = now_ms();
    let projects: Vec<Project> = Project::seed()
        .into_iter()
        .zip(0..)
        .map(|(p, i)| Project { id: base + i, ..p })
        .collect();
    let skills = Skill::samples();
    let experience = ExperienceEntry::samples();

    store.commit(&projects)?;
    store.commit(&skills)?;
    store.commit(&experience)?;
    Ok((projects.len(), skills.len(), experience.len()))
}

pub fn cmd_init(args: InitArgs, project_dir: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let folio_dir = cwd.join(FOLIO_DIR);

    if folio_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err("folio project already exists in ./folio/ (use --force to reinitialize)".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        let parent_folio = parent_root.join(FOLIO_DIR);
        eprintln!("Note: parent project found at {}/", parent_folio.display());
        eprintln!("Creating new project in ./folio/");
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(folio_dir.join(STORE_DIR))?;
    atomic_write(&folio_dir.join(CONFIG_FILE), render_folio_toml(&name).as_bytes())?;
    tracing::debug!(dir = %folio_dir.display(), "wrote folio.toml");

    println!("Initialized folio project: {}", name);

    if args.seed {
        let storage = FileStorage::open(&folio_dir.join(STORE_DIR))?;
        let (projects, skills, experience) = write_samples(storage)?;
        println!(
            "  seeded {} {}, {} {}, {} {}",
            projects,
            Project::KEY,
            skills,
            Skill::KEY,
            experience,
            ExperienceEntry::KEY
        );
    }

    Ok(())
}
