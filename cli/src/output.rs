//! Result printing.

use resource_command_core::{CommandOutcome, Response};
use resource_command_db::OutputFormat;

/// Renders a command outcome: the success message, then the data.
pub fn render(outcome: &CommandOutcome, format: OutputFormat) -> Result<String, String> {
    let mut out = String::new();
    if let Some(message) = &outcome.message {
        out.push_str(message);
        out.push('\n');
    }
    if !matches!(outcome.response, Response::Empty) {
        out.push_str(&render_response(&outcome.response, format)?);
    }
    Ok(out)
}

fn render_response(response: &Response, format: OutputFormat) -> Result<String, String> {
    let body = response.to_json();
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(&body)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|err| format!("Failed to serialize output: {err}")),
        OutputFormat::Yaml => serde_yaml::to_string(&body)
            .map_err(|err| format!("Failed to serialize output: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn outcome(body: serde_json::Value, message: Option<&str>) -> CommandOutcome {
        CommandOutcome {
            response: Response::from_json(body).unwrap(),
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_message_only_for_empty_response() {
        let rendered = render(
            &outcome(serde_json::Value::Null, Some("Override value deleted.")),
            OutputFormat::Json,
        )
        .unwrap();
        assert_eq!(rendered, "Override value deleted.\n");
    }

    #[test]
    fn test_yaml_record() {
        let rendered = render(&outcome(json!({"id": 3}), None), OutputFormat::Yaml).unwrap();
        assert_eq!(rendered, "id: 3\n");
    }

    #[test]
    fn test_json_collection_keeps_meta() {
        let rendered = render(
            &outcome(json!({"total": 3, "results": [{"id": 1}]}), None),
            OutputFormat::Json,
        )
        .unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["total"], json!(3));
        assert_eq!(parsed["results"], json!([{"id": 1}]));
    }
}
