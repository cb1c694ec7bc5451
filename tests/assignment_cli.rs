mod support;

use predicates::str::contains;
use serde_json::Value;

use support::{due_in, TestData};

fn titles(list: &Value) -> Vec<String> {
    list["assignments"]
        .as_array()
        .expect("assignments array")
        .iter()
        .map(|row| row["title"].as_str().expect("title").to_string())
        .collect()
}

#[test]
fn add_persists_and_lists_sorted_by_due() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();

    data.add("Later essay", "Literature", 72, &[]);
    data.add("Overdue lab", "Chemistry", -2, &[]);
    data.add("Soon quiz", "Math", 5, &[]);

    let list = data.json(&["list"]);
    assert_eq!(list["filter"], "active");
    assert_eq!(list["total"], 3);
    assert_eq!(
        titles(&list),
        vec!["Overdue lab", "Soon quiz", "Later essay"]
    );

    let urgencies: Vec<&str> = list["assignments"]
        .as_array()
        .expect("rows")
        .iter()
        .map(|row| row["urgency"].as_str().expect("urgency"))
        .collect();
    assert_eq!(urgencies, vec!["overdue", "soon", "upcoming"]);

    let stored = data.read_assignments();
    assert_eq!(stored.len(), 3);
    assert_eq!(stored[0]["title"], "Soon quiz");
    assert!(stored[0]["dueDate"].is_string());
    assert_eq!(stored[0]["isCompleted"], false);
    assert_eq!(stored[0]["reminders"], serde_json::json!(["at_due_date"]));

    Ok(())
}

#[test]
fn add_rejects_missing_fields() {
    let data = TestData::new();

    data.cmd()
        .args(["add", "  ", "--subject", "Math", "--due", &due_in(3)])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("title is required"));

    data.cmd()
        .args(["--json", "add", "Essay", "--subject", "Lit", "--due", "next tuesday"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("\"kind\": \"user_error\""))
        .stdout(contains("invalid due date"));

    assert!(data.read_assignments().is_empty());
}

#[test]
fn add_respects_reminder_flags() {
    let data = TestData::new();

    let created = data.json(&[
        "add",
        "Project",
        "--subject",
        "CS",
        "--due",
        &due_in(48),
        "--remind",
        "1d,1h",
    ]);
    assert_eq!(
        created["reminders"],
        serde_json::json!(["1_hour_before", "1_day_before"])
    );

    let bare = data.json(&[
        "add",
        "Reading",
        "--subject",
        "History",
        "--due",
        &due_in(48),
        "--no-reminders",
    ]);
    assert_eq!(bare["reminders"], serde_json::json!([]));

    data.cmd()
        .args([
            "add", "Bad", "--subject", "X", "--due", &due_in(1), "--remind", "weekly",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid reminder"));
}

#[test]
fn done_toggles_and_filters() {
    let data = TestData::new();
    let essay = data.add("Essay", "Literature", 24 * 3, &[]);
    data.add("Quiz", "Math", 24 * 4, &[]);

    let toggled = data.json(&["done", &essay[..8]]);
    assert_eq!(toggled["isCompleted"], true);

    assert_eq!(titles(&data.json(&["list"])), vec!["Quiz"]);
    assert_eq!(
        titles(&data.json(&["list", "--filter", "completed"])),
        vec!["Essay"]
    );
    assert_eq!(data.json(&["list", "--filter", "all"])["total"], 2);

    let reopened = data.json(&["done", &essay]);
    assert_eq!(reopened["isCompleted"], false);
    assert_eq!(data.json(&["list"])["total"], 2);
}

#[test]
fn list_rejects_unknown_filter() {
    let data = TestData::new();
    data.cmd()
        .args(["list", "--filter", "someday"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid filter"));
}

#[test]
fn edit_replaces_fields_and_rearms_reminders() {
    let data = TestData::new();
    let id = data.add("Lab report", "Biology", -1, &["at_due_date"]);

    let fired = data.json(&["watch", "--once"]);
    assert_eq!(fired["fired"].as_array().expect("fired").len(), 1);
    assert_eq!(data.read_assignments()[0]["lastNotified"]["at_due_date"], true);

    let new_due = due_in(30);
    let edited = data.json(&[
        "edit",
        &id,
        "--title",
        "Lab report v2",
        "--due",
        &new_due,
        "--notes",
        "include graphs",
    ]);
    assert_eq!(edited["title"], "Lab report v2");
    assert_eq!(edited["subject"], "Biology");
    assert_eq!(edited["notes"], "include graphs");
    assert_eq!(edited["urgency"], "upcoming");

    let stored = &data.read_assignments()[0];
    assert_eq!(stored["lastNotified"], serde_json::json!({}));
}

#[test]
fn edit_with_blank_notes_clears_them() {
    let data = TestData::new();
    let created = data.json(&[
        "add",
        "Essay",
        "--subject",
        "Lit",
        "--due",
        &due_in(10),
        "--notes",
        "draft first",
    ]);
    let id = created["id"].as_str().expect("id");

    let edited = data.json(&["edit", id, "--notes", ""]);
    assert!(edited.get("notes").is_none());
}

#[test]
fn show_reports_status_and_prefix_lookup() {
    let data = TestData::new();
    let id = data.add("Problem set", "Physics", 3, &[]);

    let shown = data.json(&["show", &id[..6]]);
    assert_eq!(shown["id"], id.as_str());
    assert_eq!(shown["urgency"], "soon");

    data.cmd()
        .args(["show", "zzzzzz"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Assignment not found"))
        .stderr(contains("assignmate list --filter all"));
}

#[test]
fn rm_with_yes_deletes() {
    let data = TestData::new();
    let id = data.add("Quiz", "Math", 10, &[]);
    data.add("Essay", "Lit", 20, &[]);

    let removed = data.json(&["rm", &id, "--yes"]);
    assert_eq!(removed["removed"], true);
    assert_eq!(removed["id"], id.as_str());

    let stored = data.read_assignments();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], "Essay");
}

#[test]
fn rm_unknown_id_is_a_noop() {
    let data = TestData::new();
    data.add("Quiz", "Math", 10, &[]);

    let removed = data.json(&["rm", "does-not-exist", "--yes"]);
    assert_eq!(removed["removed"], false);
    assert_eq!(data.read_assignments().len(), 1);
}

#[test]
fn rm_without_yes_needs_a_terminal() {
    let data = TestData::new();
    let id = data.add("Quiz", "Math", 10, &[]);

    data.cmd()
        .args(["rm", &id])
        .write_stdin("y\n")
        .assert()
        .failure()
        .code(2)
        .stderr(contains("--yes"));
    assert_eq!(data.read_assignments().len(), 1);
}

#[test]
fn stats_counts_by_urgency() {
    let data = TestData::new();
    data.add("Overdue", "A", -5, &[]);
    data.add("Soon", "B", 2, &[]);
    data.add("Upcoming", "C", 24 * 7, &[]);
    let done = data.add("Done", "D", 1, &[]);
    data.json(&["done", &done]);

    let stats = data.json(&["stats"]);
    assert_eq!(stats["total"], 4);
    assert_eq!(stats["active"], 3);
    assert_eq!(stats["overdue"], 1);
    assert_eq!(stats["soon"], 1);
    assert_eq!(stats["completed"], 1);
}

#[test]
fn malformed_data_opens_empty() -> Result<(), Box<dyn std::error::Error>> {
    let data = TestData::new();
    data.write_file("assignments.json", "{ not json")?;

    let list = data.json(&["list", "--filter", "all"]);
    assert_eq!(list["total"], 0);

    data.add("Fresh start", "Math", 4, &[]);
    assert_eq!(data.read_assignments().len(), 1);
    Ok(())
}

#[test]
fn tui_rejects_json_mode() {
    let data = TestData::new();
    data.cmd()
        .args(["--json", "tui"])
        .assert()
        .failure()
        .code(2)
        .stdout(contains("tui does not support --json"));
}
