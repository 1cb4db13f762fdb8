use serde_json::json;

use crate::config::ResolvedConfig;
use crate::db::types::ResultSet;

/// Serializes a payload for stdout, pretty-printed when the config asks for it.
pub fn render(value: &serde_json::Value, pretty: bool) -> anyhow::Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

pub fn error_json(message: &str, kind: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": message,
            "kind": kind,
        }
    })
}

pub fn result_set_rows_to_objects(result_set: &ResultSet) -> Vec<serde_json::Value> {
    result_set
        .rows
        .iter()
        .map(|row| {
            let map: serde_json::Map<String, serde_json::Value> = result_set
                .columns
                .iter()
                .zip(row.iter())
                .map(|(col, value)| {
                    let value = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                    (col.name.clone(), value)
                })
                .collect();
            serde_json::Value::Object(map)
        })
        .collect()
}

/// The password is deliberately left out; `config` output lands in
/// terminals and pipelines.
pub fn config_to_json(resolved: &ResolvedConfig) -> serde_json::Value {
    json!({
        "configPath": resolved.config_path.as_ref().map(|p| p.display().to_string()),
        "profileName": resolved.profile_name,
        "connection": {
            "server": resolved.connection.server,
            "port": resolved.connection.port,
            "database": resolved.connection.database,
            "user": resolved.connection.user,
            "passwordSet": resolved.connection.password.is_some(),
            "encrypt": resolved.connection.encrypt,
            "trustCert": resolved.connection.trust_cert,
            "timeoutMs": resolved.connection.timeout_ms,
            "defaultSchemas": resolved.connection.default_schemas,
        },
        "settings": {
            "output": {
                "defaultFormat": resolved.settings.output.default_format.as_str(),
                "json": {
                    "pretty": resolved.settings.output.json_pretty,
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionSettings, SettingsResolved};
    use crate::db::types::{Column, ResultSet, Value};

    #[test]
    fn emits_error_json() {
        let value = error_json("boom", "Internal");
        assert_eq!(value["error"]["message"], "boom");
        assert_eq!(value["error"]["kind"], "Internal");
    }

    #[test]
    fn config_json_includes_defaults() {
        let resolved = ResolvedConfig {
            config_path: None,
            profile_name: "default".to_string(),
            connection: ConnectionSettings::default(),
            settings: SettingsResolved::default(),
        };
        let value = config_to_json(&resolved);
        assert_eq!(value["profileName"], "default");
        assert_eq!(value["settings"]["output"]["defaultFormat"], "pretty");
    }

    #[test]
    fn config_json_never_carries_the_password() {
        let mut connection = ConnectionSettings::default();
        connection.password = Some("hunter2".to_string());
        let resolved = ResolvedConfig {
            config_path: None,
            profile_name: "default".to_string(),
            connection,
            settings: SettingsResolved::default(),
        };
        let value = config_to_json(&resolved);
        assert_eq!(value["connection"]["passwordSet"], true);
        assert!(value["connection"].get("password").is_none());
    }

    #[test]
    fn result_set_rows_to_objects_builds_maps() {
        let result_set = ResultSet {
            columns: vec![Column::new("name")],
            rows: vec![vec![Value::Text("db".to_string())]],
        };
        let objects = result_set_rows_to_objects(&result_set);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["name"], "db");
    }
}
