//! Request building from supplied option values.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::derive::ResolvedOptionSet;
use crate::types::{ActionSchema, Method, ValueKind};
use crate::values::SuppliedValues;

/// A request ready for the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub resource: String,
    pub action: String,
    pub method: Method,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub params: Map<String, Value>,
}

/// Builds the request parameters for an action.
///
/// Every option with a value (explicit or default) becomes a parameter.
/// `Flag` options only contribute when set, list values are joined for
/// transport, and parameters the action marks as wrapped are nested under
/// its wrapper key.
pub fn build_request(
    resource: &str,
    action: &ActionSchema,
    options: &ResolvedOptionSet,
    values: &SuppliedValues,
) -> Request {
    let mut params = Map::new();
    let mut wrapped = Map::new();

    for option in options {
        let Some(value) = values.value(&option.name) else {
            continue;
        };
        let value = match option.kind {
            ValueKind::Flag if *value != Value::Bool(true) => continue,
            ValueKind::List => join_list(value.clone()),
            _ => value.clone(),
        };

        let param = option.param_name();
        let nested = action.wrapper.is_some()
            && action.find_param(param).is_some_and(|p| p.wrapped);
        if nested {
            wrapped.insert(param.to_string(), value);
        } else {
            params.insert(param.to_string(), value);
        }
    }

    if let Some(wrapper) = &action.wrapper {
        if !wrapped.is_empty() {
            params.insert(wrapper.clone(), Value::Object(wrapped));
        }
    }

    Request {
        resource: resource.to_string(),
        action: action.name.clone(),
        method: action.method,
        path: action.path.clone(),
        params,
    }
}

/// Joins a list value with newlines; scalars pass through unchanged.
///
/// # Examples
///
/// ```
/// use resource_command_core::join_list;
/// use serde_json::json;
///
/// assert_eq!(join_list(json!(["env1", "env2"])), json!("env1\nenv2"));
/// assert_eq!(join_list(json!("env1")), json!("env1"));
/// ```
pub fn join_list(value: Value) -> Value {
    match value {
        Value::Array(items) => {
            let lines: Vec<String> = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => s,
                    other => other.to_string(),
                })
                .collect();
            Value::String(lines.join("\n"))
        }
        other => other,
    }
}
