#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use chrono::{Duration, Utc};
use serde_json::Value;
use tempfile::TempDir;

/// A throwaway data directory with the terminal notification backend.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let data = Self {
            dir: tempfile::tempdir().expect("failed to create tempdir"),
        };
        data.write_config("[notifications]\nbackend = \"terminal\"\n")
            .expect("write config");
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_file(&self, rel_path: &str, contents: &str) -> std::io::Result<PathBuf> {
        let path = self.dir.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }

    pub fn write_config(&self, contents: &str) -> std::io::Result<PathBuf> {
        self.write_file("config.toml", contents)
    }

    pub fn read_file(&self, rel_path: &str) -> Option<String> {
        fs::read_to_string(self.dir.path().join(rel_path)).ok()
    }

    pub fn read_assignments(&self) -> Vec<Value> {
        let Some(raw) = self.read_file("assignments.json") else {
            return Vec::new();
        };
        serde_json::from_str(&raw).expect("assignments.json is valid json")
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = assignmate_cmd();
        cmd.arg("--data-dir").arg(self.path());
        cmd
    }

    /// Run with `--json`, assert success, and return the `data` payload.
    pub fn json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let envelope: Value = serde_json::from_slice(&output).expect("json envelope");
        assert_eq!(envelope["status"], "success");
        envelope["data"].clone()
    }

    /// Add an assignment due `hours` from now and return its id.
    pub fn add(&self, title: &str, subject: &str, hours: i64, remind: &[&str]) -> String {
        let due = due_in(hours);
        let mut args = vec!["add", title, "--subject", subject, "--due", due.as_str()];
        for kind in remind {
            args.push("--remind");
            args.push(kind);
        }
        let data = self.json(&args);
        data["id"].as_str().expect("assignment id").to_string()
    }
}

pub fn assignmate_cmd() -> Command {
    let mut cmd = Command::cargo_bin("assignmate").expect("binary");
    cmd.env_remove("ASSIGNMATE_DIR").env_remove("RUST_LOG");
    cmd
}

/// RFC 3339 timestamp `hours` from now (negative for the past).
pub fn due_in(hours: i64) -> String {
    (Utc::now() + Duration::hours(hours)).to_rfc3339()
}
