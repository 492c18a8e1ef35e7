use predicates::prelude::*;

mod common;

#[test]
fn test_render_yaml_to_stdout() {
    let mut ctx = common::ixrender();
    let file = ctx.write("app.yaml", common::WEB_APP);

    ctx.cmd
        .arg("render")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("nginx:latest"))
        .stdout(predicate::str::contains("root $$document_root;"))
        .stdout(predicate::str::contains("x-portals:"))
        .stdout(predicate::str::contains("Open $$URL"));
}

#[test]
fn test_render_json_to_file() {
    let mut ctx = common::ixrender();
    let file = ctx.write("app.yaml", common::WEB_APP);
    let out = ctx.dir.path().join("compose.json");

    ctx.cmd
        .arg("render")
        .arg(&file)
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let document: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(document["services"]["web"]["expose"], serde_json::json!(["8080/tcp"]));
    assert_eq!(document["x-portals"][0]["name"], "Web UI");
    assert_eq!(document["configs"]["site"]["content"], "root $$document_root;");
}

#[test]
fn test_render_empty_composition_fails() {
    let mut ctx = common::ixrender();
    let file = ctx.write(
        "empty.json",
        r#"{"values": {"images": {}}, "containers": []}"#,
    );

    ctx.cmd
        .arg("render")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one container"));
}

#[test]
fn test_render_unknown_dependency_fails() {
    let mut ctx = common::ixrender();
    let file = ctx.write(
        "app.yaml",
        r#"
values:
  images:
    image: {repository: nginx, tag: latest}
containers:
  - name: web
    image: image
    depends_on: {db: service_started}
"#,
    );

    ctx.cmd
        .arg("render")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown container [db]"));
}

#[test]
fn test_render_duplicate_container_fails() {
    let mut ctx = common::ixrender();
    let file = ctx.write(
        "app.yaml",
        r#"
values:
  images:
    image: {repository: nginx, tag: latest}
containers:
  - {name: web, image: image}
  - {name: web, image: image}
"#,
    );

    ctx.cmd
        .arg("render")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_render_missing_file_fails() {
    let mut ctx = common::ixrender();
    ctx.cmd
        .arg("render")
        .arg("missing.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_log_level_from_env() {
    let ctx = common::ixrender();
    let file = ctx.write("app.yaml", common::WEB_APP);

    ctx.new_cmd()
        .env("IXRENDER_LOG", "debug")
        .arg("render")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("Rendered composition"));
}
