use std::fs;
use std::path::Path;

use crate::io::file_storage::atomic_write;
use crate::io::project_io::ProjectError;
use crate::model::config::FolioConfig;
use crate::model::workspace::CONFIG_FILE;

/// Read the project config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(folio_dir: &Path) -> Result<(FolioConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = folio_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: FolioConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(folio_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ProjectError> {
    let config_path = folio_dir.join(CONFIG_FILE);
    atomic_write(&config_path, doc.to_string().as_bytes()).map_err(|e| ProjectError::WriteError {
        path: config_path,
        source: e,
    })
}

/// Look up a dotted key such as `ui.rows_per_page`.
pub fn get_value(doc: &toml_edit::DocumentMut, key: &str) -> Option<String> {
    let mut item = doc.as_item();
    for part in key.split('.') {
        item = item.get(part)?;
    }
    Some(match item.as_value()? {
        toml_edit::Value::String(s) => s.value().clone(),
        toml_edit::Value::Integer(n) => n.value().to_string(),
        toml_edit::Value::Float(f) => f.value().to_string(),
        toml_edit::Value::Boolean(b) => b.value().to_string(),
        other => other.clone().decorated("", "").to_string(),
    })
}

/// Set a dotted key, creating intermediate tables as needed.
///
/// `true`/`false` and integers are stored as such; anything else as a string.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, tables)) = parts.split_last() else {
        return;
    };

    let mut table = doc.as_table_mut();
    for part in tables {
        if !table.contains_key(part) {
            table[*part] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        let Some(next) = table[*part].as_table_mut() else {
            return;
        };
        table = next;
    }
    table[*last] = parse_scalar(raw);
}

fn parse_scalar(raw: &str) -> toml_edit::Item {
    match raw {
        "true" => toml_edit::value(true),
        "false" => toml_edit::value(false),
        _ => match raw.parse::<i64>() {
            Ok(n) => toml_edit::value(n),
            Err(_) => toml_edit::value(raw),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"# portfolio store
[store]
name = "test"

[ui]
rows_per_page = 5 # rows per table page
"#
    }

    #[test]
    fn test_round_trip_config() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("folio.toml");

        let original = sample_config();
        fs::write(&config_path, original).unwrap();

        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.store.name, "test");
        write_config(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(&config_path).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn test_set_existing_value_keeps_comments() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "ui.rows_per_page", "10");
        let result = doc.to_string();
        assert!(result.contains("# portfolio store"));
        let config: FolioConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.ui.rows_per_page, 10);
    }

    #[test]
    fn test_set_creates_missing_table() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        set_value(&mut doc, "remote.base_url", "http://localhost:8000/api");
        set_value(&mut doc, "collections.seed_projects", "true");
        let config: FolioConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(
            config.remote.base_url.as_deref(),
            Some("http://localhost:8000/api")
        );
        assert!(config.collections.seed_projects);
    }

    #[test]
    fn test_get_value() {
        let doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert_eq!(get_value(&doc, "store.name").as_deref(), Some("test"));
        assert_eq!(get_value(&doc, "ui.rows_per_page").as_deref(), Some("5"));
        assert_eq!(get_value(&doc, "ui.missing"), None);
        assert_eq!(get_value(&doc, "ui"), None);
    }
}
