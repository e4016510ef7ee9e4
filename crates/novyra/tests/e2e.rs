// SPDX-FileCopyrightText: 2026 Novyra Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the `novyra` binary.
//!
//! Each test writes its own config pointing at a temp SQLite database and
//! drives the compiled binary. Tests are independent and order-insensitive.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

struct Workspace {
    dir: tempfile::TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        Self::with_config("")
    }

    fn with_config(extra: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("novyra.db");
        let config = dir.path().join("novyra.toml");
        std::fs::write(
            &config,
            format!(
                "[storage]\ndatabase_path = \"{}\"\n\n{extra}",
                db.display()
            ),
        )
        .unwrap();
        Self { dir, config }
    }

    fn run(&self, args: &[&str]) -> Output {
        novyra(&self.config, args)
    }

    fn db_exists(&self) -> bool {
        self.dir.path().join("novyra.db").exists()
    }
}

fn novyra(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_novyra"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env("RUST_LOG", "off")
        .env_remove("DEEPSEEK_API_KEY")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ---- config ----

#[test]
fn config_prints_effective_toml() {
    let ws = Workspace::new();
    let out = ws.run(&["config"]);

    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("[assistant]"));
    assert!(text.contains("[business_hours]"));
    assert!(text.contains("novyra.db"));
    // Printing config never touches the database.
    assert!(!ws.db_exists());
}

#[test]
fn config_masks_api_key() {
    let ws = Workspace::with_config("[responder]\napi_key = \"sk-secret-value\"\n");
    let out = ws.run(&["config"]);

    assert!(out.status.success(), "{}", stderr(&out));
    assert!(!stdout(&out).contains("sk-secret-value"));
}

#[test]
fn unknown_config_key_fails_with_diagnostic() {
    let ws = Workspace::with_config("[engine]\nconfidence_treshold = 0.8\n");
    let out = ws.run(&["config"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("confidence_treshold"), "{}", stderr(&out));
}

// ---- seed ----

#[test]
fn seed_runs_once() {
    let ws = Workspace::new();

    let first = ws.run(&["seed"]);
    assert!(first.status.success(), "{}", stderr(&first));
    assert!(stdout(&first).contains("seeded 6 knowledge entries"));

    let second = ws.run(&["seed"]);
    assert!(second.status.success());
    assert!(stdout(&second).contains("nothing added"));
}

// ---- staff ----

#[test]
fn staff_add_then_list() {
    let ws = Workspace::new();

    let added = ws.run(&["staff", "add", "ada", "--name", "Ada Obi", "--email", "ada@novyra.local"]);
    assert!(added.status.success(), "{}", stderr(&added));
    assert!(stdout(&added).contains("Ada Obi"));

    let listed = ws.run(&["staff", "list"]);
    assert!(listed.status.success());
    let text = stdout(&listed);
    assert!(text.contains("ada"));
    assert!(text.contains("available"));
    assert!(text.contains("0/5"));
}

#[test]
fn staff_away_shows_in_list() {
    let ws = Workspace::new();
    ws.run(&["staff", "add", "ada"]);

    let away = ws.run(&["staff", "away", "1"]);
    assert!(away.status.success(), "{}", stderr(&away));

    let text = stdout(&ws.run(&["staff", "list"]));
    assert!(text.contains("away"));
}

#[test]
fn empty_staff_list_has_hint() {
    let ws = Workspace::new();
    let out = ws.run(&["staff", "list"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("novyra staff add"));
}

// ---- status ----

#[test]
fn status_reports_healthy_adapters() {
    let ws = Workspace::new();
    ws.run(&["seed"]);
    ws.run(&["staff", "add", "ada"]);

    let out = ws.run(&["status", "--json"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let status: serde_json::Value = serde_json::from_str(&stdout(&out)).unwrap();
    assert_eq!(status["healthy"], true);
    assert_eq!(status["knowledge_entries"], 6);
    assert_eq!(status["staff"], 1);
    assert_eq!(status["agents_with_free_slots"], 1);
    let names: Vec<_> = status["adapters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["sqlite", "log"]);
}

#[test]
fn status_plain_output() {
    let ws = Workspace::new();
    let out = ws.run(&["status"]);
    assert!(out.status.success(), "{}", stderr(&out));
    let text = stdout(&out);
    assert!(text.contains("sqlite"));
    assert!(text.contains("healthy"));
    assert!(text.contains("knowledge entries"));
}

// ---- session commands ----

#[test]
fn closing_unknown_session_fails() {
    let ws = Workspace::new();
    let out = ws.run(&["close", "no-such-session"]);

    assert!(!out.status.success());
    assert!(stderr(&out).contains("not found"), "{}", stderr(&out));
}

#[test]
fn reply_to_unknown_session_fails() {
    let ws = Workspace::new();
    ws.run(&["staff", "add", "ada"]);

    let out = ws.run(&["reply", "no-such-session", "--as", "1", "hello"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("not found"));
}

#[test]
fn no_subcommand_prints_hint() {
    let ws = Workspace::new();
    let out = ws.run(&[]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("--help"));
}
