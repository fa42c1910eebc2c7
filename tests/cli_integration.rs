//! Integration tests for the `folio` CLI.
//!
//! Each test creates a temp project directory, runs `folio` as a subprocess,
//! and verifies stdout and/or store file contents.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::mpsc;
use std::time::Duration;

/// Get the path to the built `folio` binary.
fn folio_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("folio");
    path
}

/// Create a test project with three projects and two rows per page.
fn create_test_project(root: &Path) {
    let folio_dir = root.join("folio");
    fs::create_dir_all(folio_dir.join("store")).unwrap();

    fs::write(
        folio_dir.join("folio.toml"),
        r#"# test store
[store]
name = "Test Folio"

[ui]
rows_per_page = 2
watch_interval_ms = 20
"#,
    )
    .unwrap();

    fs::write(
        folio_dir.join("store/projects.json"),
        r#"[
  {"id": 1, "title": "Portfolio Website", "status": "completed", "description": "Personal site", "category": "Web"},
  {"id": 2, "title": "Mobile App", "status": "ongoing", "description": "Expense tracker", "category": "Mobile"},
  {"id": 3, "title": "Blog CMS", "status": "Completed", "description": "Markdown blog", "category": "Website"}
]"#,
    )
    .unwrap();
}

/// Run `folio` with the given args in the given directory, returning (stdout, stderr, success).
fn run_folio(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(folio_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("FOLIO_LOG")
        .output()
        .expect("failed to run folio");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `folio` expecting success, return stdout.
fn run_folio_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_folio(dir, args);
    if !success {
        panic!(
            "folio {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut args = args.to_vec();
    args.push("--json");
    let out = run_folio_ok(dir, &args);
    serde_json::from_str(&out).unwrap()
}

fn read_store(root: &Path, key: &str) -> serde_json::Value {
    let text = fs::read_to_string(root.join(format!("folio/store/{}.json", key))).unwrap();
    serde_json::from_str(&text).unwrap()
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_creates_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let out = run_folio_ok(tmp.path(), &["init", "--name", "My Folio"]);
    assert!(out.contains("Initialized folio project: My Folio"));
    assert!(tmp.path().join("folio/folio.toml").exists());
    assert!(tmp.path().join("folio/store").is_dir());

    let (_, stderr, success) = run_folio(tmp.path(), &["init"]);
    assert!(!success);
    assert!(stderr.contains("already exists"));

    run_folio_ok(tmp.path(), &["init", "--force"]);
}

#[test]
fn test_init_seed() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_folio_ok(tmp.path(), &["init", "--seed"]);

    let parsed = run_json(tmp.path(), &["projects", "list"]);
    assert_eq!(parsed["summary"]["total"], 4);
    assert_eq!(parsed["summary"]["ongoing"], 2);
    assert_eq!(parsed["summary"]["completed"], 2);

    let parsed = run_json(tmp.path(), &["skills", "list", "--all"]);
    assert_eq!(parsed["items"].as_array().unwrap().len(), 6);
    assert_eq!(parsed["summary"]["averageYears"].as_f64(), Some(1.8));
}

#[test]
fn test_not_a_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let (_, stderr, success) = run_folio(tmp.path(), &["projects"]);
    assert!(!success);
    assert!(stderr.contains("error: not a folio project"));
}

#[test]
fn test_project_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    let elsewhere = tempfile::TempDir::new().unwrap();

    let dir = tmp.path().to_str().unwrap();
    let parsed = run_json(elsewhere.path(), &["-C", dir, "projects", "list"]);
    assert_eq!(parsed["summary"]["total"], 3);

    let (_, stderr, success) = run_folio(elsewhere.path(), &["-C", "/no/such/dir", "projects"]);
    assert!(!success);
    assert!(stderr.contains("cannot resolve -C path"));
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[test]
fn test_projects_list_first_page() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(tmp.path(), &["projects"]);
    assert!(out.contains("3 projects  1 ongoing  2 completed"));
    assert!(out.contains("Portfolio Website"));
    assert!(out.contains("Mobile App"));
    assert!(!out.contains("Blog CMS"));
    assert!(out.contains("page 1/2 (2 of 3 shown)"));
}

#[test]
fn test_projects_list_page_is_clamped() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(tmp.path(), &["projects", "list", "--page", "9"]);
    assert_eq!(parsed["page"], 2);
    assert_eq!(parsed["total_pages"], 2);
    let items = parsed["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Blog CMS");
}

#[test]
fn test_projects_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(tmp.path(), &["projects", "list", "--search", "  EXPENSE "]);
    assert_eq!(parsed["matched"], 1);
    assert_eq!(parsed["items"][0]["id"], 2);

    let out = run_folio_ok(tmp.path(), &["projects", "list", "-s", "nothing-like-this"]);
    assert!(out.contains("no projects found"));
}

#[test]
fn test_projects_show() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(tmp.path(), &["projects", "show", "2"]);
    assert!(out.contains("Mobile App (2)"));
    assert!(out.contains("status: ongoing"));
    assert!(out.contains("  Expense tracker"));

    let (_, stderr, success) = run_folio(tmp.path(), &["projects", "show", "99"]);
    assert!(!success);
    assert!(stderr.contains("project not found: 99"));
}

#[test]
fn test_projects_add_writes_store_and_activity() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(
        tmp.path(),
        &["projects", "add", "--title", " CLI Tool ", "-d", "A tool", "--category", "Research"],
    );
    assert!(out.contains("Project added successfully"));

    let stored = read_store(tmp.path(), "projects");
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[3]["title"], "CLI Tool");
    assert_eq!(stored[3]["status"], "ongoing");
    assert!(stored[3]["id"].as_i64().unwrap() > 3);

    let activity = read_store(tmp.path(), "recentActivity");
    assert_eq!(activity[0]["message"], "Added project: CLI Tool");
}

#[test]
fn test_projects_add_validation_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let (_, stderr, success) = run_folio(tmp.path(), &["projects", "add", "--title", "No description"]);
    assert!(!success);
    assert!(stderr.contains("error: please fill in all required fields"));

    assert_eq!(read_store(tmp.path(), "projects").as_array().unwrap().len(), 3);
    assert!(!tmp.path().join("folio/store/recentActivity.json").exists());
}

#[test]
fn test_projects_update() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(tmp.path(), &["projects", "update", "1", "--status", "ongoing"]);
    assert_eq!(parsed["message"], "Project updated successfully");
    assert_eq!(parsed["record"]["title"], "Portfolio Website");
    assert_eq!(parsed["record"]["status"], "ongoing");

    let stored = read_store(tmp.path(), "projects");
    assert_eq!(stored[0]["status"], "ongoing");
    assert_eq!(stored[0]["description"], "Personal site");

    let activity = read_store(tmp.path(), "recentActivity");
    assert_eq!(activity[0]["message"], "Updated project: Portfolio Website");
}

#[test]
fn test_projects_delete() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(tmp.path(), &["projects", "delete", "2"]);
    assert!(out.contains("Project deleted successfully"));
    let stored = read_store(tmp.path(), "projects");
    let ids: Vec<i64> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 3]);

    let (_, stderr, success) = run_folio(tmp.path(), &["projects", "delete", "2"]);
    assert!(!success);
    assert!(stderr.contains("project not found: 2"));
}

#[test]
fn test_malformed_store_reads_as_empty() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    fs::write(tmp.path().join("folio/store/projects.json"), "{not json").unwrap();

    let parsed = run_json(tmp.path(), &["projects", "list"]);
    assert_eq!(parsed["summary"]["total"], 0);
    assert_eq!(parsed["total_pages"], 1);
}

#[test]
fn test_missing_ids_are_assigned_on_load() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());
    fs::write(
        tmp.path().join("folio/store/projects.json"),
        r#"[{"title": "A", "status": "ongoing", "description": "x"}, {"id": 5, "title": "B", "status": "ongoing", "description": "y"}]"#,
    )
    .unwrap();

    run_folio_ok(tmp.path(), &["projects", "list"]);
    let stored = read_store(tmp.path(), "projects");
    assert!(stored[0]["id"].as_i64().unwrap() > 5);
    assert_eq!(stored[1]["id"], 5);
}

// ---------------------------------------------------------------------------
// Skills and experience
// ---------------------------------------------------------------------------

#[test]
fn test_skills_crud() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(
        tmp.path(),
        &["skills", "add", "--name", "Rust", "--level", "Expert", "--experience", "2 years"],
    );
    assert_eq!(parsed["message"], "Skill added successfully");
    assert_eq!(parsed["record"]["visibility"], "Show");
    let id = parsed["record"]["id"].as_i64().unwrap().to_string();

    run_folio_ok(tmp.path(), &["skills", "update", &id, "--visibility", "hide"]);
    let parsed = run_json(tmp.path(), &["skills", "list"]);
    assert_eq!(parsed["summary"]["total"], 1);
    assert_eq!(parsed["summary"]["expert"], 1);
    assert_eq!(parsed["summary"]["averageYears"].as_f64(), Some(2.0));
    assert_eq!(parsed["items"][0]["visibility"], "Hide");

    let (_, stderr, success) = run_folio(tmp.path(), &["skills", "add", "--name", "Go"]);
    assert!(!success);
    assert!(stderr.contains("skill experience is empty"));

    run_folio_ok(tmp.path(), &["skills", "delete", &id]);
    let activity = read_store(tmp.path(), "recentActivity");
    assert_eq!(activity[0]["message"], "Deleted skill: Rust");
}

#[test]
fn test_experience_summary() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    run_folio_ok(
        tmp.path(),
        &[
            "experience", "add", "--role", "Intern Developer", "--company", "Acme", "--type",
            "Internship", "--duration", "Jan 2023 - Jul 2023",
        ],
    );
    run_folio_ok(
        tmp.path(),
        &[
            "experience", "add", "--role", "Engineer", "--company", "Beta", "--duration",
            "Aug 2023 - Present",
        ],
    );

    let parsed = run_json(tmp.path(), &["experience", "list"]);
    assert_eq!(parsed["summary"]["total"], 2);
    assert_eq!(parsed["summary"]["currentRole"], "Engineer");
    assert_eq!(parsed["summary"]["years"].as_f64(), Some(0.5));
    assert_eq!(parsed["items"][1]["type"], "Professional");
}

// ---------------------------------------------------------------------------
// Dashboard and activity
// ---------------------------------------------------------------------------

#[test]
fn test_dashboard_stats() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(tmp.path(), &["dashboard"]);
    let stats = &parsed["stats"];
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["ongoing"], 1);
    assert_eq!(stats["completed"], 2);
    assert_eq!(stats["percentages"]["completed"], 67);
    assert_eq!(stats["percentages"]["inProgress"], 33);
    assert_eq!(
        stats["categories"],
        serde_json::json!({"Web": 2, "Mobile": 1, "Marketing": 0, "Research": 0})
    );
    assert_eq!(parsed["recent_activity"], serde_json::json!([]));

    let out = run_folio_ok(tmp.path(), &["dashboard"]);
    assert!(out.contains("Test Folio"));
    assert!(out.contains("67% completed  33% in progress"));
    assert!(out.contains("none yet"));
}

#[test]
fn test_dashboard_add_normalizes() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(
        tmp.path(),
        &["dashboard", "add", "--title", "Quick", "-d", "fast", "--status", "COMPLETED"],
    );
    assert_eq!(parsed["record"]["status"], "completed");
    assert_eq!(parsed["record"]["category"], "Web");

    let parsed = run_json(tmp.path(), &["dashboard"]);
    assert_eq!(parsed["stats"]["total"], 4);
    assert_eq!(parsed["recent_activity"][0]["message"], "Added project: Quick");
}

#[test]
fn test_activity_is_newest_first_and_limited() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    for title in ["One", "Two", "Three"] {
        run_folio_ok(tmp.path(), &["projects", "add", "--title", title, "-d", "x"]);
    }

    let parsed = run_json(tmp.path(), &["activity", "--limit", "2"]);
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["message"], "Added project: Three");
    assert_eq!(entries[1]["message"], "Added project: Two");

    let out = run_folio_ok(tmp.path(), &["activity"]);
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn test_activity_log_is_bounded() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    for i in 0..12 {
        let title = format!("P{}", i);
        run_folio_ok(tmp.path(), &["projects", "add", "--title", &title, "-d", "x"]);
    }
    let activity = read_store(tmp.path(), "recentActivity");
    let activity = activity.as_array().unwrap();
    assert_eq!(activity.len(), 10);
    assert_eq!(activity[0]["message"], "Added project: P11");
}

// ---------------------------------------------------------------------------
// Settings, profile, config
// ---------------------------------------------------------------------------

#[test]
fn test_settings() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let parsed = run_json(tmp.path(), &["settings"]);
    assert_eq!(parsed["twoFactorEnabled"], true);
    assert_eq!(parsed["walletAddress"], serde_json::Value::Null);

    let out = run_folio_ok(tmp.path(), &["settings", "two-factor", "off"]);
    assert!(out.contains("Two-factor authentication disabled"));
    assert!(out.contains("two-factor: off"));

    run_folio_ok(tmp.path(), &["settings", "wallet", "0xabc"]);
    run_folio_ok(tmp.path(), &["settings", "device", "add", "Laptop"]);
    let (_, stderr, success) = run_folio(tmp.path(), &["settings", "device", "add", "Laptop"]);
    assert!(!success);
    assert!(stderr.contains("already authorized"));

    let parsed = run_json(tmp.path(), &["settings"]);
    assert_eq!(parsed["twoFactorEnabled"], false);
    assert_eq!(parsed["walletAddress"], "0xabc");
    assert_eq!(parsed["devices"][0]["name"], "Laptop");
}

#[test]
fn test_profile() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(tmp.path(), &["profile"]);
    assert!(out.contains("[U]"));

    let out = run_folio_ok(
        tmp.path(),
        &["profile", "set", "--name", "christian", "--handle", "@chris"],
    );
    assert!(out.contains("Profile updated"));
    assert!(out.contains("[C] christian"));
    assert!(out.contains("handle: @chris"));

    let stored = read_store(tmp.path(), "profileData");
    assert_eq!(stored["name"], "christian");
}

#[test]
fn test_config_get_set() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let out = run_folio_ok(tmp.path(), &["config", "get", "ui.rows_per_page"]);
    assert_eq!(out.trim(), "2");

    run_folio_ok(tmp.path(), &["config", "set", "ui.rows_per_page", "10"]);
    let out = run_folio_ok(tmp.path(), &["config", "get", "ui.rows_per_page"]);
    assert_eq!(out.trim(), "10");

    let text = fs::read_to_string(tmp.path().join("folio/folio.toml")).unwrap();
    assert!(text.starts_with("# test store"));

    let parsed = run_json(tmp.path(), &["projects", "list"]);
    assert_eq!(parsed["items"].as_array().unwrap().len(), 3);

    let (_, _, success) = run_folio(tmp.path(), &["config", "set", "ui.rows_per_page", "many"]);
    assert!(!success);
    let out = run_folio_ok(tmp.path(), &["config", "get", "ui.rows_per_page"]);
    assert_eq!(out.trim(), "10");

    let (_, stderr, success) = run_folio(tmp.path(), &["config", "get", "ui.nope"]);
    assert!(!success);
    assert!(stderr.contains("no value for 'ui.nope'"));
}

#[test]
fn test_seed_projects_config() {
    let tmp = tempfile::TempDir::new().unwrap();
    run_folio_ok(tmp.path(), &["init"]);

    let parsed = run_json(tmp.path(), &["projects", "list"]);
    assert_eq!(parsed["summary"]["total"], 0);
    assert!(!tmp.path().join("folio/store/projects.json").exists());

    run_folio_ok(tmp.path(), &["config", "set", "collections.seed_projects", "true"]);
    let parsed = run_json(tmp.path(), &["projects", "list"]);
    assert_eq!(parsed["summary"]["total"], 4);
    assert_eq!(read_store(tmp.path(), "projects").as_array().unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Watch
// ---------------------------------------------------------------------------

#[test]
fn test_watch_sees_other_process() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let mut child = Command::new(folio_bin())
        .args(["watch", "projects", "--count", "1", "--json"])
        .current_dir(tmp.path())
        .env_remove("FOLIO_LOG")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // The banner is printed once the watcher is registered.
    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut banner = String::new();
    stderr.read_line(&mut banner).unwrap();
    assert!(banner.contains("watching projects"), "banner: {}", banner);

    run_folio_ok(tmp.path(), &["projects", "add", "--title", "Live", "-d", "x"]);

    let mut stdout = child.stdout.take().unwrap();
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut out = String::new();
        let _ = stdout.read_to_string(&mut out);
        let _ = tx.send(out);
    });
    let out = match rx.recv_timeout(Duration::from_secs(10)) {
        Ok(out) => out,
        Err(_) => {
            let _ = child.kill();
            panic!("watch did not report the change");
        }
    };
    assert!(child.wait().unwrap().success());

    let event: serde_json::Value = serde_json::from_str(out.lines().next().unwrap()).unwrap();
    assert_eq!(event["key"], "projects");
    assert_eq!(event["channel"], "cross-context");
    assert_eq!(event["count"], 4);
    assert_eq!(event["removed"], false);
}

// ---------------------------------------------------------------------------
// Remote
// ---------------------------------------------------------------------------

/// Answer one HTTP request with `status` and `body`; returns the base URL.
fn serve_once(status: u16, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 8192];
        let _ = stream.read(&mut buf);
        let response = format!(
            "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = stream.write_all(response.as_bytes());
    });
    format!("http://{}/api", addr)
}

#[test]
fn test_remote_list_without_project() {
    let tmp = tempfile::TempDir::new().unwrap();
    let url = serve_once(
        200,
        r#"{"data":[{"id":7,"title":"Remote","status":"ongoing","description":"x"}]}"#,
    );

    let parsed = run_json(tmp.path(), &["remote", "--url", &url, "list"]);
    assert_eq!(parsed["summary"]["total"], 1);
    assert_eq!(parsed["items"][0]["id"], 7);
}

#[test]
fn test_remote_failure_is_reported() {
    let tmp = tempfile::TempDir::new().unwrap();
    let url = serve_once(500, "{}");

    let (_, stderr, success) = run_folio(tmp.path(), &["remote", "--url", &url]);
    assert!(!success);
    assert!(stderr.contains("error: server returned status 500"));
}

#[test]
fn test_remote_requires_base_url() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_project(tmp.path());

    let (_, stderr, success) = run_folio(tmp.path(), &["remote", "list"]);
    assert!(!success);
    assert!(stderr.contains("no backend configured"));
}
