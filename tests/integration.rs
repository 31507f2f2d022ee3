use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use tablet_log::config::load_config;
use tablet_log::db;
use tablet_log::sqlite_store::SqliteRowStore;
use tablet_log_core::models::{Cell, Row};

fn binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("tablet-log");
    path
}

fn setup_test_env(sheet_extra: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/tablet-log.sqlite"

[sheet]
name = "工作表1"
{}

[server]
bind = "127.0.0.1:0"

[logging]
filter = "warn"
"#,
        root.display(),
        sheet_extra
    );

    let config_path = config_dir.join("tablet-log.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run tablet-log at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

fn sheet_rows(config_path: &Path) -> Vec<(Row, bool)> {
    let cfg = load_config(config_path).unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let pool = db::connect(&cfg).await.unwrap();
        let store = SqliteRowStore::new(pool, cfg.sheet.name.clone());
        store.rows().await.unwrap()
    })
}

const VALID: [&str; 10] = [
    "--field", "name=AB",
    "--field", "grade=1A",
    "--field", "type=borrow",
    "--field", "qty=3",
    "--field", "remark=test",
];

#[test]
fn test_init_writes_header() {
    let (_tmp, config_path) = setup_test_env("");

    let (stdout, stderr, success) = run(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(stdout.contains("header row written"));

    let rows = sheet_rows(&config_path);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0.len(), 8);
    assert_eq!(rows[0].0.cells[2], Cell::from("Name Abbreviation"));
    assert!(rows[0].1, "header should be bold");
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env("");

    let (_, _, success1) = run(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (stdout, _, success2) = run(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
    assert!(!stdout.contains("header row written"));

    let (stdout, _, success3) = run(&config_path, &["headers"]);
    assert!(success3);
    assert!(stdout.contains("already present"));

    assert_eq!(sheet_rows(&config_path).len(), 1);
}

#[test]
fn test_submit_appends_success_row() {
    let (_tmp, config_path) = setup_test_env("");
    run(&config_path, &["init"]);

    let mut args = vec!["submit"];
    args.extend_from_slice(&VALID);
    let (stdout, stderr, success) = run(&config_path, &args);
    assert!(success, "submit failed: stdout={}, stderr={}", stdout, stderr);
    assert_eq!(stdout.trim(), "OK");

    let rows = sheet_rows(&config_path);
    assert_eq!(rows.len(), 2);
    let row = &rows[1].0;
    assert_eq!(row.cells[2], Cell::from("AB"));
    assert_eq!(row.cells[5], Cell::Int(3));
    assert_eq!(row.cells[7], Cell::from("Success"));
    assert!(!rows[1].1);
}

#[test]
fn test_submit_invalid_records_error_row() {
    let (_tmp, config_path) = setup_test_env("");
    run(&config_path, &["init"]);

    let (stdout, _, success) = run(
        &config_path,
        &["submit", "--field", "name=a", "--field", "qty=0"],
    );
    assert!(!success);
    assert_eq!(stdout.trim(), "VALIDATION_ERROR");

    let rows = sheet_rows(&config_path);
    assert_eq!(rows.len(), 2);
    match rows[1].0.status() {
        Some(Cell::Text(s)) => assert!(s.starts_with("Failed: 驗證失敗 - "), "{}", s),
        other => panic!("unexpected status {:?}", other),
    }
}

#[test]
fn test_submit_without_init_is_server_error() {
    let (_tmp, config_path) = setup_test_env("");

    let mut args = vec!["submit"];
    args.extend_from_slice(&VALID);
    let (stdout, _, success) = run(&config_path, &args);
    assert!(!success);
    assert_eq!(stdout.trim(), "SERVER_ERROR");
}

#[test]
fn test_with_other_schema_end_to_end() {
    let (_tmp, config_path) = setup_test_env("schema = \"with_other\"");
    run(&config_path, &["init"]);

    let (stdout, _, success) = run(
        &config_path,
        &[
            "submit",
            "--field", "name=CD",
            "--field", "grade=5B",
            "--field", "type=其他",
            "--field", "other=broken screen",
            "--field", "qty=1",
        ],
    );
    assert!(success, "stdout={}", stdout);

    let rows = sheet_rows(&config_path);
    assert_eq!(rows[0].0.len(), 9);
    assert_eq!(rows[1].0.cells[5], Cell::from("broken screen"));
    assert_eq!(rows[1].0.cells[6], Cell::Int(1));
}

#[test]
fn test_bad_config_fails() {
    let (_tmp, config_path) = setup_test_env("timezone = \"Mars/Olympus\"");
    let (_, stderr, success) = run(&config_path, &["init"]);
    assert!(!success);
    assert!(stderr.contains("timezone"), "stderr={}", stderr);
}
