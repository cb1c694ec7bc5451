mod support;

use predicates::str::contains;

use support::TestData;

#[test]
fn notify_permission_lifecycle() {
    let data = TestData::new();

    let status = data.json(&["notify", "status"]);
    assert_eq!(status["permission"], "default");
    assert_eq!(status["backend"], "terminal");
    assert_eq!(status["supported"], true);

    let allowed = data.json(&["notify", "allow"]);
    assert_eq!(allowed["permission"], "granted");
    assert_eq!(data.read_file("permission").as_deref().map(str::trim), Some("granted"));

    let denied = data.json(&["notify", "deny"]);
    assert_eq!(denied["permission"], "denied");

    let status = data.json(&["notify", "status"]);
    assert_eq!(status["permission"], "denied");
}

#[test]
fn notify_test_only_delivers_when_granted() {
    let data = TestData::new();

    let blocked = data.json(&["notify", "test"]);
    assert_eq!(blocked["delivered"], false);

    data.json(&["notify", "allow"]);
    data.cmd()
        .args(["--json", "notify", "test"])
        .assert()
        .success()
        .stdout(contains("\"delivered\": true"))
        .stderr(contains("Notifications are working."));
}

#[test]
fn notify_errors_use_two_word_command_name() {
    let data = TestData::new();
    data.write_config("[notifications]\nbackend = \"terminal\"\n")
        .expect("config");
    std::fs::create_dir_all(data.path().join("permission")).expect("block permission file");

    data.cmd()
        .args(["--json", "notify", "allow"])
        .assert()
        .failure()
        .stdout(contains("\"command\": \"notify allow\""));
}

#[test]
fn theme_set_show_and_toggle() {
    let data = TestData::new();
    data.write_config("[notifications]\nbackend = \"terminal\"\n\n[display]\ntheme = \"dark\"\n")
        .expect("config");

    let shown = data.json(&["theme"]);
    assert_eq!(shown["theme"], "dark");
    assert_eq!(shown["updated"], false);

    let set = data.json(&["theme", "light"]);
    assert_eq!(set["theme"], "light");
    assert_eq!(data.read_file("theme").as_deref().map(str::trim), Some("light"));

    let toggled = data.json(&["theme", "toggle"]);
    assert_eq!(toggled["theme"], "dark");
    assert_eq!(data.json(&["theme"])["theme"], "dark");
}

#[test]
fn theme_rejects_unknown_value() {
    let data = TestData::new();
    data.cmd()
        .args(["theme", "solarized"])
        .assert()
        .failure()
        .code(2)
        .stderr(contains("invalid theme"));
}
