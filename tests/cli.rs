use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const FORM: &str = r#"{
  "fields": [
    { "name": "simple" },
    { "name": "with_cls", "widget": { "attrs": { "class": "class0" } } }
  ]
}"#;

fn cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("widget-tweaks").unwrap();
    cmd.current_dir(config_dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .arg("--config-dir")
        .arg(config_dir);
    cmd
}

#[test]
fn test_render_template() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("form.json"), FORM).unwrap();
    fs::write(
        temp_dir.path().join("page.html"),
        r#"{{ form.with_cls|add_class("wide") }}
{% render_field form.simple placeholder=form.simple.label %}"#,
    )
    .unwrap();

    cmd(temp_dir.path())
        .arg("render")
        .arg(temp_dir.path().join("page.html"))
        .arg("--form")
        .arg(temp_dir.path().join("form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"class="class0 wide""#))
        .stdout(predicate::str::contains(r#"placeholder="Simple""#));
}

#[test]
fn test_render_with_data_and_vars() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("form.json"), FORM).unwrap();
    fs::write(temp_dir.path().join("data.json"), r#"{ "with_cls": "x" }"#).unwrap();
    fs::write(
        temp_dir.path().join("page.html"),
        "{% render_field form.simple %}|{% render_field form.with_cls %}",
    )
    .unwrap();

    cmd(temp_dir.path())
        .arg("render")
        .arg(temp_dir.path().join("page.html"))
        .arg("--form")
        .arg(temp_dir.path().join("form.json"))
        .arg("--data")
        .arg(temp_dir.path().join("data.json"))
        .arg("--var")
        .arg("WIDGET_ERROR_CLASS=is-invalid")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"name="simple" class="is-invalid" required id="id_simple""#))
        .stdout(predicate::str::contains(r#"value="x" class="class0" required"#));
}

#[test]
fn test_render_uses_configured_class() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("form.json"), FORM).unwrap();
    fs::write(temp_dir.path().join("page.html"), "{% render_field form.simple %}").unwrap();

    cmd(temp_dir.path())
        .args(["config", "required-class", "is-required"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set required-class = is-required"));

    cmd(temp_dir.path())
        .arg("render")
        .arg(temp_dir.path().join("page.html"))
        .arg("--form")
        .arg(temp_dir.path().join("form.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"class="is-required""#));
}

#[test]
fn test_render_bad_var() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("form.json"), FORM).unwrap();
    fs::write(temp_dir.path().join("page.html"), "{{ form.simple }}").unwrap();

    cmd(temp_dir.path())
        .arg("render")
        .arg(temp_dir.path().join("page.html"))
        .arg("--form")
        .arg(temp_dir.path().join("form.json"))
        .arg("--var")
        .arg("novalue")
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected KEY=VALUE"));
}

#[test]
fn test_check_reports_syntax_errors() {
    let temp_dir = tempfile::tempdir().unwrap();
    let good = temp_dir.path().join("good.html");
    let bad = temp_dir.path().join("bad.html");
    fs::write(&good, r#"{% render_field form.simple class="a" %}"#).unwrap();
    fs::write(&bad, "line one\n{% render_field form.simple class %}").unwrap();

    cmd(temp_dir.path())
        .arg("check")
        .arg(&good)
        .arg(&bad)
        .assert()
        .failure()
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("line 2"))
        .stderr(predicate::str::contains("1 template(s) failed to compile"));

    cmd(temp_dir.path()).arg("check").arg(&good).assert().success();
}

#[test]
fn test_filters_lists_library() {
    let temp_dir = tempfile::tempdir().unwrap();
    cmd(temp_dir.path())
        .arg("filters")
        .assert()
        .success()
        .stdout(predicate::str::contains("add_error_class"))
        .stdout(predicate::str::contains("widget_type"))
        .stdout(predicate::str::contains("render_field"));
}

#[test]
fn test_config_show_and_clear() {
    let temp_dir = tempfile::tempdir().unwrap();

    cmd(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("error-class = (unset)"))
        .stdout(predicate::str::contains("required-class = (unset)"));

    cmd(temp_dir.path())
        .args(["config", "error-class", "err"])
        .assert()
        .success();
    assert!(temp_dir.path().join("widget-tweaks.json").exists());

    cmd(temp_dir.path())
        .args(["config", "error-class"])
        .assert()
        .success()
        .stdout(predicate::str::contains("error-class = err"));

    cmd(temp_dir.path())
        .args(["config", "error-class", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared error-class"));
}

#[test]
fn test_config_unknown_key() {
    let temp_dir = tempfile::tempdir().unwrap();
    cmd(temp_dir.path())
        .args(["config", "colour"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key 'colour'"));
}
