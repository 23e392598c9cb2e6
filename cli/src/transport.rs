//! Offline transports for the binary.
//!
//! [`FixtureTransport`] answers from a file of canned responses keyed by
//! `resource#action`; [`DryRunTransport`] echoes the request back so users
//! can see what would be sent.

use std::collections::HashMap;
use std::path::Path;

use resource_command_core::{FieldError, Request, Transport, TransportError};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
struct ApiFailure {
    message: String,
    #[serde(default)]
    field_errors: Vec<FieldError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFailure {
    error: ApiFailure,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Fixture {
    Failure(FixtureFailure),
    Body(Value),
}

/// Answers requests from canned responses.
///
/// # Fixture file
///
/// ```yaml
/// smart_class_parameters#index:
///   total: 2
///   results:
///     - { id: 1, parameter: ntp_servers }
/// override_values#create:
///   error:
///     message: Validation failed
///     field_errors:
///       - { field: match, messages: [has already been taken] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureTransport {
    fixtures: HashMap<String, Fixture>,
}

impl FixtureTransport {
    /// Loads fixtures from a YAML or JSON file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| format!("Failed to read fixtures '{}': {err}", path.display()))?;
        Self::from_yaml(&text)
            .map_err(|err| format!("Failed to parse fixtures '{}': {err}", path.display()))
    }

    /// Parses fixtures from YAML text (JSON is accepted too).
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        let fixtures = serde_yaml::from_str(text)?;
        Ok(Self { fixtures })
    }
}

impl Transport for FixtureTransport {
    fn issue(&self, request: &Request) -> Result<Value, TransportError> {
        let key = format!("{}#{}", request.resource, request.action);
        debug!(fixture = %key, "Answering from fixtures");

        match self.fixtures.get(&key) {
            Some(Fixture::Body(body)) => Ok(body.clone()),
            Some(Fixture::Failure(FixtureFailure { error })) => Err(TransportError::Api {
                message: error.message.clone(),
                field_errors: error.field_errors.clone(),
            }),
            None => Err(TransportError::Network(format!("no fixture for {key}"))),
        }
    }
}

/// Returns the request itself as the response record.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunTransport;

impl Transport for DryRunTransport {
    fn issue(&self, request: &Request) -> Result<Value, TransportError> {
        let mut echo = Map::new();
        echo.insert("method".to_string(), json!(request.method));
        if let Some(template) = &request.path {
            echo.insert(
                "path".to_string(),
                Value::String(render_path(template, &request.params)),
            );
        }
        echo.insert("params".to_string(), Value::Object(request.params.clone()));
        Ok(Value::Object(echo))
    }
}

/// Fills `:name` segments of a path template from top-level parameters.
fn render_path(template: &str, params: &Map<String, Value>) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => match params.get(name) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => segment.to_string(),
            },
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use resource_command_core::Method;

    use super::*;

    fn request(resource: &str, action: &str) -> Request {
        let mut params = Map::new();
        params.insert("smart_class_parameter_id".to_string(), json!("12"));
        Request {
            resource: resource.to_string(),
            action: action.to_string(),
            method: Method::Post,
            path: Some("/api/smart_class_parameters/:smart_class_parameter_id/override_values".into()),
            params,
        }
    }

    const FIXTURES: &str = r#"
smart_class_parameters#index:
  total: 2
  results:
    - { id: 1, parameter: ntp_servers }
override_values#create:
  error:
    message: Validation failed
    field_errors:
      - { field: match, messages: [has already been taken] }
"#;

    #[test]
    fn test_fixture_body() {
        let transport = FixtureTransport::from_yaml(FIXTURES).unwrap();
        let body = transport
            .issue(&request("smart_class_parameters", "index"))
            .unwrap();
        assert_eq!(body["total"], json!(2));
    }

    #[test]
    fn test_fixture_failure() {
        let transport = FixtureTransport::from_yaml(FIXTURES).unwrap();
        let err = transport
            .issue(&request("override_values", "create"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed\n  match: has already been taken"
        );
    }

    #[test]
    fn test_missing_fixture() {
        let transport = FixtureTransport::default();
        let err = transport.issue(&request("hosts", "index")).unwrap_err();
        assert_eq!(err, TransportError::Network("no fixture for hosts#index".into()));
    }

    #[test]
    fn test_dry_run_renders_path() {
        let body = DryRunTransport
            .issue(&request("override_values", "create"))
            .unwrap();
        assert_eq!(body["method"], json!("POST"));
        assert_eq!(
            body["path"],
            json!("/api/smart_class_parameters/12/override_values")
        );
        assert_eq!(body["params"]["smart_class_parameter_id"], json!("12"));
    }
}
