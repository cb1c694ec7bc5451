mod support;

use predicates::str::contains;
use serde_json::Value;

use support::TestData;

fn fired_kinds(data: &Value) -> Vec<String> {
    data["fired"]
        .as_array()
        .expect("fired array")
        .iter()
        .map(|reminder| reminder["kind"].as_str().expect("kind").to_string())
        .collect()
}

#[test]
fn watch_once_fires_each_reminder_once() {
    let data = TestData::new();
    data.json(&["notify", "allow"]);
    data.add("Overdue essay", "Literature", -1, &["at_due_date"]);

    let first = data.json(&["watch", "--once"]);
    assert_eq!(first["permission"], "granted");
    assert_eq!(fired_kinds(&first), vec!["at_due_date"]);
    assert_eq!(first["fired"][0]["title"], "Assignment Due Now!");
    assert_eq!(
        first["fired"][0]["body"],
        "Overdue essay is due for Literature."
    );

    let second = data.json(&["watch", "--once"]);
    assert!(fired_kinds(&second).is_empty());
}

#[test]
fn watch_once_fires_only_open_windows() {
    let data = TestData::new();
    data.json(&["notify", "allow"]);
    // Due in 30 minutes: the one-hour window is open, the due-date one is not.
    let due = (chrono::Utc::now() + chrono::Duration::minutes(30)).to_rfc3339();
    data.json(&[
        "add",
        "Quiz",
        "--subject",
        "Math",
        "--due",
        &due,
        "--remind",
        "at_due_date,1_hour_before,1_day_before",
    ]);

    let fired = data.json(&["watch", "--once"]);
    assert_eq!(fired_kinds(&fired), vec!["1_hour_before"]);

    let stored = data.read_assignments();
    assert_eq!(
        stored[0]["lastNotified"],
        serde_json::json!({ "1_hour_before": true })
    );
}

#[test]
fn completed_assignments_never_fire() {
    let data = TestData::new();
    let id = data.add("Finished lab", "Chemistry", -3, &["at_due_date"]);
    data.json(&["done", &id]);

    let fired = data.json(&["watch", "--once"]);
    assert!(fired_kinds(&fired).is_empty());
}

#[test]
fn reminders_are_marked_without_permission() {
    let data = TestData::new();
    data.add("Overdue essay", "Literature", -1, &["at_due_date"]);

    data.cmd()
        .args(["watch", "--once"])
        .assert()
        .success()
        .stdout(contains("Fired       1"))
        .stdout(contains("warning: notifications are not enabled"));

    assert_eq!(data.read_assignments()[0]["lastNotified"]["at_due_date"], true);

    data.json(&["notify", "allow"]);
    let later = data.json(&["watch", "--once"]);
    assert!(fired_kinds(&later).is_empty());
}

#[test]
fn delivered_reminders_reach_the_terminal_backend() {
    let data = TestData::new();
    data.json(&["notify", "allow"]);
    data.add("Reading", "History", -1, &["at_due_date"]);

    data.cmd()
        .args(["--quiet", "watch", "--once"])
        .assert()
        .success()
        .stderr(contains("Assignment Due Now!: Reading is due for History."));
}
