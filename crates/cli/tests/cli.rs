use assert_cmd::Command;
use serde_json::Value;

fn shelf_cli() -> Command {
    let mut cmd = Command::cargo_bin("shelf-cli").unwrap();
    cmd.env("SHELF_CONFIG_DIR", std::env::temp_dir().join("shelf-cli-no-config"))
        .env_remove("SHELF_ENV");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn openapi_lists_book_routes() {
    let doc = stdout_json(shelf_cli().arg("openapi"));

    assert!(doc["paths"]["/books"]["get"].is_object());
    assert!(doc["paths"]["/books"]["post"].is_object());
    assert!(doc["paths"]["/books/{id}"]["put"].is_object());
    assert!(doc["paths"]["/healthz"]["get"].is_object());
}

#[test]
fn openapi_honours_base_path() {
    let doc = stdout_json(
        shelf_cli()
            .env("SHELF_SERVER__BASE_PATH", "/api")
            .args(["openapi", "--pretty"]),
    );

    assert!(doc["paths"]["/api/books/{id}"]["delete"].is_object());
    assert!(doc["paths"]["/books"].is_null());
}

#[test]
fn config_prints_resolved_settings() {
    let settings = stdout_json(
        shelf_cli()
            .env("SHELF_SERVER__PORT", "9090")
            .env("SHELF_BOOKS__ID_STRATEGY", "length")
            .arg("config"),
    );

    assert_eq!(settings["environment"], "local");
    assert_eq!(settings["server"]["port"], 9090);
    assert_eq!(settings["books"]["id_strategy"], "length");
}

#[test]
fn unknown_environment_fails() {
    shelf_cli()
        .env("SHELF_ENV", "qa")
        .arg("config")
        .assert()
        .failure();
}
