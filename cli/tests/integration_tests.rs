use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn sc_param(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sc-param"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run sc-param")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_str(&stdout(output)).expect("stdout is not JSON")
}

fn write_fixtures(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("fixtures.yaml");
    fs::write(&path, yaml).expect("failed to write fixtures");
    path
}

// ---------------------------------------------------------------------------
// Dry run
// ---------------------------------------------------------------------------

#[test]
fn update_dry_run_wraps_and_joins_list() {
    let output = sc_param(&[
        "smart-class-parameter",
        "update",
        "--id",
        "7",
        "--override",
        "yes",
        "--override-value-order",
        "fqdn,hostgroup,os",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let text = stdout(&output);
    let (message, body) = text.split_once('\n').unwrap();
    assert_eq!(message, "Parameter updated.");

    let body: Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["method"], "PUT");
    assert_eq!(body["path"], "/api/smart_class_parameters/7");
    assert_eq!(body["params"]["id"], "7");
    assert_eq!(body["params"]["smart_class_parameter"]["override"], true);
    assert_eq!(
        body["params"]["smart_class_parameter"]["override_value_order"],
        "fqdn\nhostgroup\nos"
    );
}

#[test]
fn dry_run_prints_request_without_response_defaults() {
    let output = sc_param(&["smart-class-parameter", "list", "--search", "x"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout_json(&output),
        serde_json::json!({
            "method": "GET",
            "path": "/api/smart_class_parameters",
            "params": {"search": "x"},
        })
    );

    let output = sc_param(&["smart-class-parameter", "info", "--id", "7"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body = stdout_json(&output);
    assert!(body.get("parameter_type").is_none());
    assert!(body.get("use_puppet_default").is_none());
    assert_eq!(body["path"], "/api/smart_class_parameters/7");
}

#[test]
fn fixture_collection_meta_is_printed_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = write_fixtures(
        &dir,
        r#"
smart_class_parameters#index:
  total: 2
  subtotal: 2
  page: 1
  per_page: 20
  search: null
  sort: { by: null, order: null }
  results:
    - { id: 1, parameter: ntp_servers, parameter_type: boolean }
    - { id: 1, parameter: ntp_servers, parameter_type: boolean }
"#,
    );

    let output = sc_param(&[
        "--fixtures",
        fixtures.to_str().unwrap(),
        "host",
        "sc-params",
        "--host-id",
        "4",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body = stdout_json(&output);
    assert_eq!(body["search"], Value::Null);
    assert!(body.as_object().unwrap().contains_key("search"));
    assert_eq!(body["sort"], serde_json::json!({"by": null, "order": null}));
    assert_eq!(body["results"].as_array().unwrap().len(), 1);
}

#[test]
fn update_by_name_requires_puppetclass() {
    let output = sc_param(&[
        "smart-class-parameter",
        "update",
        "--name",
        "ntp_servers",
        "--override-value-order",
        "a,b,c",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).is_empty(), "no request should be printed");
    assert!(stderr(&output).contains(
        "One of options --puppetclass-name, --puppetclass-id is required when --name is used."
    ));
}

#[test]
fn add_matcher_reports_all_violations() {
    let output = sc_param(&[
        "smart-class-parameter",
        "add-matcher",
        "--smart-class-parameter-name",
        "ntp_servers",
        "--use-puppet-default",
        "true",
        "--value",
        "pool.ntp.org",
    ]);

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert!(err.contains("Could not validate options:"));
    assert!(err.contains("Cannot use --value when --use-puppet-default is true."));
    assert!(err.contains("--puppetclass-name, --puppetclass-id"));
}

#[test]
fn invalid_enum_value_is_a_violation() {
    let output = sc_param(&[
        "smart-class-parameter",
        "update",
        "--id",
        "7",
        "--parameter-type",
        "float",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("--parameter-type"));
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let output = sc_param(&["smart-class-parameter", "info", "--bogus", "1"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn brief_list_exposes_only_parent_options() {
    let output = sc_param(&["host", "sc-params", "--help"]);
    assert!(output.status.success());

    let help = stdout(&output);
    assert!(help.contains("--host-id"));
    assert!(help.contains("--host-name"));
    assert!(!help.contains("--puppetclass-id"));
    assert!(!help.contains("--environment-name"));
}

// ---------------------------------------------------------------------------
// Deprecated aliases
// ---------------------------------------------------------------------------

#[test]
fn deprecated_alias_warns_and_runs_replacement() {
    let output = sc_param(&[
        "--output",
        "json",
        "smart-class-parameter",
        "add-override-value",
        "--smart-class-parameter-id",
        "12",
        "--match",
        "os=Debian",
        "--value",
        "pool.ntp.org",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains(
        "add-override-value command is deprecated and will be removed in one of the future \
         versions. Please use add-matcher command instead."
    ));
    assert!(stdout(&output).starts_with("Override value created.\n"));
}

#[test]
fn deprecated_alias_is_hidden_from_help() {
    let output = sc_param(&["smart-class-parameter", "--help"]);
    let help = stdout(&output);
    assert!(help.contains("add-matcher"));
    assert!(!help.contains("add-override-value"));
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

#[test]
fn brief_list_deduplicates_and_keeps_total() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = write_fixtures(
        &dir,
        r#"
smart_class_parameters#index:
  total: 3
  page: 1
  results:
    - { id: 1, parameter: ntp_servers, default_value: pool.ntp.org, override: false }
    - { id: 1, parameter: ntp_servers, default_value: pool.ntp.org, override: false }
    - { id: 2, parameter: dns_servers, default_value: 1.1.1.1, override: true }
"#,
    );

    let output = sc_param(&[
        "--fixtures",
        fixtures.to_str().unwrap(),
        "puppet-class",
        "sc-params",
        "--puppetclass-name",
        "ntp",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body = stdout_json(&output);
    assert_eq!(body["total"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][1]["parameter"], "dns_servers");
}

#[test]
fn info_injects_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = write_fixtures(
        &dir,
        r#"
smart_class_parameters#show:
  id: 7
  parameter: ntp_servers
  parameter_type: ""
"#,
    );

    let output = sc_param(&[
        "--fixtures",
        fixtures.to_str().unwrap(),
        "--output",
        "yaml",
        "smart-class-parameter",
        "info",
        "--id",
        "7",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body: Value = serde_yaml::from_str(&stdout(&output)).unwrap();
    assert_eq!(body["parameter_type"], "string");
    assert_eq!(body["use_puppet_default"], false);
}

#[test]
fn api_failure_is_prefixed_with_failure_message() {
    let dir = tempfile::tempdir().unwrap();
    let fixtures = write_fixtures(
        &dir,
        r#"
override_values#destroy:
  error:
    message: Resource not found
"#,
    );

    let output = sc_param(&[
        "--fixtures",
        fixtures.to_str().unwrap(),
        "smart-class-parameter",
        "remove-matcher",
        "--smart-class-parameter-id",
        "12",
        "--id",
        "3",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("error: Could not delete the override value: Resource not found"));
}

// ---------------------------------------------------------------------------
// Configuration and schemas
// ---------------------------------------------------------------------------

#[test]
fn config_supplies_output_and_page_size() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("sc-param.yml");
    fs::write(&config, "output: yaml\nper_page: 50\n").unwrap();

    let output = sc_param(&[
        "--config",
        config.to_str().unwrap(),
        "smart-class-parameter",
        "list",
        "--search",
        "parameter ~ ntp",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body: Value = serde_yaml::from_str(&stdout(&output)).unwrap();
    assert_eq!(body["params"]["per_page"], 50);
    assert_eq!(body["params"]["search"], "parameter ~ ntp");
}

#[test]
fn explicit_schema_directory_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let bundle: Value = serde_json::from_str(include_str!("../schemas/foreman.json")).unwrap();
    for resource in bundle["resources"].as_array().unwrap() {
        let name = resource["name"].as_str().unwrap();
        let mut resource = resource.clone();
        if name == "smart_class_parameters" {
            resource["associations"] = serde_json::json!([
                {"name": "hosts", "singular": "host"},
                {"name": "hostgroups", "singular": "hostgroup"},
                {"name": "puppetclasses", "singular": "puppetclass", "searchables": ["name", "label"]},
                {"name": "environments", "singular": "environment"}
            ]);
        }
        fs::write(
            dir.path().join(format!("{name}.json")),
            serde_json::to_string_pretty(&resource).unwrap(),
        )
        .unwrap();
    }

    let output = sc_param(&[
        "--schema",
        dir.path().to_str().unwrap(),
        "puppet-class",
        "sc-params",
        "--help",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("--puppetclass-label"));
}

#[test]
fn broken_schema_source_falls_back_to_embedded() {
    let output = sc_param(&[
        "--schema",
        "/nonexistent/schemas",
        "host",
        "sc-params",
        "--host-id",
        "4",
    ]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let body = stdout_json(&output);
    assert_eq!(body["params"]["host_id"], "4");
}
