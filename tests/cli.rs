use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const BIN_NAME: &str = "tuition";

const ROSTER: &str = r#"{
  "schema_version": 1,
  "window": "one_and_half_year",
  "children": [
    { "child_id": "1", "name": "Haddad Lina", "class": "A6", "parent_name": "Karim Haddad (0612 345)" },
    { "child_id": "2", "name": "Haddad Sami", "class": "B1" },
    { "child_id": "3", "name": "Benali Yanis", "class": "A5", "parent_name": "Nadia Benali" },
    { "child_id": "4", "name": "Rami Nour", "class": "B0", "parent_name": "Hana Rami" }
  ]
}"#;

const STATEMENT: &str = "Date,Name,Amount
01.09.25,KARIM HADDAD,45.00
02.09.25,Nadia Benali,\"15,00\"
03.09.25,Stadtwerke Bonn,80.00
";

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("roster.json"), ROSTER).unwrap();
        fs::write(dir.path().join("statement.csv"), STATEMENT).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
        cmd.env("TUITION_LEDGER_DIR", self.dir.path().join("home"));
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn run(&self) {
        self.command()
            .arg("run")
            .arg(self.path("roster.json"))
            .arg(self.path("statement.csv"))
            .assert()
            .success();
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn cli_without_command_prints_overview() {
    Workspace::new()
        .command()
        .assert()
        .success()
        .stdout(contains("tuition --help"));
}

#[test]
fn cli_fee_lookup() {
    let ws = Workspace::new();
    ws.command()
        .args(["fee", "b2"])
        .assert()
        .success()
        .stdout(contains("15.00€ per month"));

    ws.command()
        .args(["fee", "X1"])
        .assert()
        .success()
        .stdout(contains("25.00€").and(contains("fallback")));
}

#[test]
fn cli_status_decodes_colors() {
    let ws = Workspace::new();
    ws.command()
        .args(["status", "FFFF0000"])
        .assert()
        .success()
        .stdout(contains("Nothing paid"));

    ws.command()
        .args(["status", "#ffc000"])
        .assert()
        .success()
        .stdout(contains("Partial payment"));

    ws.command()
        .args(["status", "123"])
        .assert()
        .success()
        .stdout(contains("Unknown"));
}

#[test]
fn cli_init_writes_settings() {
    let ws = Workspace::new();
    ws.command()
        .arg("init")
        .assert()
        .success()
        .stdout(contains("Settings written to"));

    let settings = read(&ws.path("home").join("config.json"));
    assert!(settings.contains("\"tier_a_fee\": 2500"));

    ws.command()
        .arg("config")
        .assert()
        .success()
        .stdout(contains("Initialized:    yes"));
}

#[test]
fn cli_invalid_settings_abort() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.path("home")).unwrap();
    fs::write(ws.path("home").join("config.json"), "{ not json").unwrap();

    ws.command().args(["fee", "A5"]).assert().failure();
}

#[test]
fn cli_dry_run_writes_nothing() {
    let ws = Workspace::new();
    ws.command()
        .arg("run")
        .arg(ws.path("roster.json"))
        .arg(ws.path("statement.csv"))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("Dry run").and(contains("Stadtwerke Bonn")));

    assert_eq!(read(&ws.path("roster.json")), ROSTER);
    assert!(!ws.path("home").join("audit.log").exists());
}

#[test]
fn cli_run_updates_roster_and_audit() {
    let ws = Workspace::new();
    ws.command()
        .arg("run")
        .arg(ws.path("roster.json"))
        .arg(ws.path("statement.csv"))
        .assert()
        .success()
        .stdout(
            contains("Haddad Lina")
                .and(contains("paid €15 instead of €25"))
                .and(contains("Roster written to")),
        );

    let roster: serde_json::Value = serde_json::from_str(&read(&ws.path("roster.json"))).unwrap();
    assert_eq!(roster["window"], "two_year");
    assert_eq!(roster["children"][0]["allocated"], 3000);
    assert_eq!(roster["children"][1]["allocated"], 1500);
    assert_eq!(roster["children"][1]["parent_name"], "Karim Haddad");
    assert_eq!(roster["applied_imports"].as_array().unwrap().len(), 2);

    ws.command()
        .args(["audit", "--limit", "50"])
        .assert()
        .success()
        .stdout(contains("RUN").and(contains("ALLOCATION")));
}

#[test]
fn cli_run_keeps_roster_when_audit_log_fails() {
    let ws = Workspace::new();
    fs::create_dir_all(ws.path("home").join("audit.log")).unwrap();

    ws.command()
        .arg("run")
        .arg(ws.path("roster.json"))
        .arg(ws.path("statement.csv"))
        .assert()
        .success()
        .stdout(contains("Roster written to").and(contains("audit log not written")));

    let roster: serde_json::Value = serde_json::from_str(&read(&ws.path("roster.json"))).unwrap();
    assert_eq!(roster["children"][0]["allocated"], 3000);
}

#[test]
fn cli_rerun_is_idempotent() {
    let ws = Workspace::new();
    ws.run();
    let first = read(&ws.path("roster.json"));

    ws.command()
        .arg("run")
        .arg(ws.path("roster.json"))
        .arg(ws.path("statement.csv"))
        .assert()
        .success()
        .stdout(contains("2 already applied"));

    assert_eq!(read(&ws.path("roster.json")), first);
}

#[test]
fn cli_run_to_separate_output() {
    let ws = Workspace::new();
    ws.command()
        .arg("run")
        .arg(ws.path("roster.json"))
        .arg(ws.path("statement.csv"))
        .arg("--output")
        .arg(ws.path("updated.json"))
        .arg("--test")
        .args(["--limit", "2"])
        .assert()
        .success();

    assert_eq!(read(&ws.path("roster.json")), ROSTER);
    let updated: serde_json::Value =
        serde_json::from_str(&read(&ws.path("updated.json"))).unwrap();
    assert_eq!(updated["children"][0]["allocated"], 3000);
    assert_eq!(updated["children"][2]["allocated"], 0);
}

#[test]
fn cli_missing_roster_fails() {
    let ws = Workspace::new();
    ws.command()
        .arg("run")
        .arg(ws.path("missing.json"))
        .arg(ws.path("statement.csv"))
        .assert()
        .failure();
}

#[test]
fn cli_report_formats() {
    let ws = Workspace::new();
    ws.run();

    ws.command()
        .arg("report")
        .arg(ws.path("roster.json"))
        .assert()
        .success()
        .stdout(contains("4 children"));

    ws.command()
        .arg("report")
        .arg(ws.path("roster.json"))
        .args(["--format", "csv"])
        .assert()
        .success()
        .stdout(contains("Child ID,Name,Parent,Class"));

    ws.command()
        .arg("report")
        .arg(ws.path("roster.json"))
        .args(["--format", "yaml"])
        .assert()
        .success()
        .stdout(contains("# Tuition Payment Report"));

    ws.command()
        .arg("report")
        .arg(ws.path("roster.json"))
        .args(["--format", "json", "--output"])
        .arg(ws.path("report.json"))
        .assert()
        .success();
    let report: serde_json::Value = serde_json::from_str(&read(&ws.path("report.json"))).unwrap();
    assert_eq!(report["report"]["totals"]["children"], 4);
}

#[test]
fn cli_export_ledger() {
    let ws = Workspace::new();
    ws.run();

    ws.command()
        .arg("export-ledger")
        .arg(ws.path("roster.json"))
        .arg(ws.path("ledger.csv"))
        .assert()
        .success()
        .stdout(contains("Exported 4 children"));

    let ledger = read(&ws.path("ledger.csv"));
    let header = ledger.lines().next().unwrap();
    assert!(header.starts_with("Child ID,Name,Class,Parent,Allocated"));
    assert!(ledger.contains("Fully paid"));
}
