//! Parsing of `juju status` YAML output.

use buildcloud_common::error::Result;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

#[derive(Debug, Deserialize)]
struct StatusDocument {
    #[serde(default)]
    machines: Option<Mapping>,
}

/// Returns the machine identifiers listed under `machines`, in document
/// order. Non-string keys (machine `0`) are rendered as strings.
///
/// # Errors
///
/// Returns an error if the output is not valid YAML.
pub fn parse_machines(status: &str) -> Result<Vec<String>> {
    let document: StatusDocument = serde_yaml::from_str(status)?;
    let machines = document.machines.unwrap_or_default();
    Ok(machines.keys().filter_map(key_to_string).collect())
}

fn key_to_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => {
            tracing::warn!(?key, "skipping unsupported machine key");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: &str = r#"
environment: cwr-aws
machines:
  "0":
    agent-state: started
    dns-name: 10.0.0.1
  "1":
    agent-state: started
services:
  mysql:
    charm: cs:trusty/mysql
"#;

    #[test]
    fn lists_machine_keys_in_order() {
        assert_eq!(parse_machines(STATUS).expect("parse"), vec!["0", "1"]);
    }

    #[test]
    fn integer_keys_are_accepted() {
        let status = "machines:\n  0: {agent-state: started}\n  2: {agent-state: pending}\n";
        assert_eq!(parse_machines(status).expect("parse"), vec!["0", "2"]);
    }

    #[test]
    fn missing_or_null_machines_yield_nothing() {
        assert!(parse_machines("environment: x\n").expect("parse").is_empty());
        assert!(parse_machines("machines:\n").expect("parse").is_empty());
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(parse_machines("machines: [unclosed").is_err());
    }
}
