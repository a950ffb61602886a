//! Codec configuration: active node types, document markers and connection policy.
//!
//! Configuration files may be written in JSON, YAML or TOML:
//!
//! ```yaml
//! nodes:
//!   - name: dialogue
//!   - name: choice
//! format:
//!   separator: "~~~"
//! policy:
//!   allow_self_loops: false
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};
use crate::serialization::fragment::{is_directive_line, is_header_token, HEADER_SIGIL};

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension (`json`, `yaml`/`yml`, `toml`).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }
}

/// 一个需要激活的节点类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTypeConfig {
    #[serde(alias = "Name")]
    pub name: String,
}

impl NodeTypeConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 文档标记配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    pub begin_marker: String,
    pub separator: String,
    pub end_marker: String,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            begin_marker: "=== graph ===".to_string(),
            separator: "---".to_string(),
            end_marker: "=== end ===".to_string(),
        }
    }
}

impl FormatConfig {
    fn validate(&self) -> GraphResult<()> {
        let markers = [
            ("begin_marker", &self.begin_marker),
            ("separator", &self.separator),
            ("end_marker", &self.end_marker),
        ];
        for (field, marker) in markers {
            let trimmed = marker.trim();
            if trimmed.is_empty() {
                return Err(GraphError::InvalidConfig(format!("{} is blank", field)));
            }
            if marker.contains(['\n', '\r']) {
                return Err(GraphError::InvalidConfig(format!(
                    "{} must be a single line",
                    field
                )));
            }
            if trimmed.starts_with(HEADER_SIGIL) {
                return Err(GraphError::InvalidConfig(format!(
                    "{} '{}' would be read as a fragment header",
                    field, trimmed
                )));
            }
            if is_directive_line(trimmed) {
                return Err(GraphError::InvalidConfig(format!(
                    "{} '{}' would be read as a directive",
                    field, trimmed
                )));
            }
        }

        let mut distinct = HashSet::new();
        for (field, marker) in markers {
            if !distinct.insert(marker.trim()) {
                return Err(GraphError::InvalidConfig(format!(
                    "{} '{}' collides with another marker",
                    field,
                    marker.trim()
                )));
            }
        }
        Ok(())
    }
}

/// 连接策略
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionPolicy {
    /// Whether a node may connect to itself. Off by default.
    pub allow_self_loops: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Node types to activate, consumed by `NodeTypeRegistry::reconcile`.
    #[serde(default)]
    pub nodes: Vec<NodeTypeConfig>,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub policy: ConnectionPolicy,
}

impl GraphConfig {
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.name.as_str()).collect()
    }

    pub fn validate(&self) -> GraphResult<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !is_header_token(&node.name) {
                return Err(GraphError::InvalidConfig(format!(
                    "node type name '{}' must be non-empty without whitespace",
                    node.name
                )));
            }
            if !seen.insert(node.name.as_str()) {
                return Err(GraphError::InvalidConfig(format!(
                    "node type '{}' is listed twice",
                    node.name
                )));
            }
        }
        self.format.validate()
    }
}

/// Parse and validate configuration content.
pub fn parse_config(content: &str, format: ConfigFormat) -> GraphResult<GraphConfig> {
    let config: GraphConfig = match format {
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| GraphError::ConfigParse(e.to_string()))?
        }
        ConfigFormat::Yaml => {
            serde_saphyr::from_str(content).map_err(|e| GraphError::ConfigParse(e.to_string()))?
        }
        ConfigFormat::Toml => {
            // TOML goes through serde_json::Value so every format shares one
            // deserialization path.
            let toml_val: toml::Value =
                toml::from_str(content).map_err(|e| GraphError::ConfigParse(e.to_string()))?;
            serde_json::from_value(toml_value_to_json(toml_val))
                .map_err(|e| GraphError::ConfigParse(e.to_string()))?
        }
    };
    config.validate()?;
    Ok(config)
}

/// Read a configuration file, choosing the format from its extension.
pub fn load_config(path: impl AsRef<Path>) -> GraphResult<GraphConfig> {
    let path = path.as_ref();
    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ConfigFormat::from_extension)
        .ok_or_else(|| {
            GraphError::ConfigParse(format!(
                "cannot tell config format of '{}'",
                path.display()
            ))
        })?;
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content, format)?;
    tracing::debug!(path = %path.display(), nodes = config.nodes.len(), "config loaded");
    Ok(config)
}

fn toml_value_to_json(val: toml::Value) -> serde_json::Value {
    match val {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_value_to_json).collect())
        }
        toml::Value::Table(tbl) => serde_json::Value::Object(
            tbl.into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
nodes:
  - name: dialogue
  - Name: choice
format:
  separator: "~~~"
"#;
        let config = parse_config(yaml, ConfigFormat::Yaml).unwrap();
        assert_eq!(config.node_names(), vec!["dialogue", "choice"]);
        assert_eq!(config.format.separator, "~~~");
        assert_eq!(config.format.begin_marker, "=== graph ===");
        assert!(!config.policy.allow_self_loops);
    }

    #[test]
    fn test_parse_json() {
        let json = r#"{"nodes":[{"Name":"relay"}],"policy":{"allow_self_loops":true}}"#;
        let config = parse_config(json, ConfigFormat::Json).unwrap();
        assert_eq!(config.nodes, vec![NodeTypeConfig::new("relay")]);
        assert!(config.policy.allow_self_loops);
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[[nodes]]
name = "dialogue"

[format]
end_marker = "=== fin ==="
"#;
        let config = parse_config(toml_str, ConfigFormat::Toml).unwrap();
        assert_eq!(config.node_names(), vec!["dialogue"]);
        assert_eq!(config.format.end_marker, "=== fin ===");
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(
            parse_config("{}", ConfigFormat::Json).unwrap(),
            GraphConfig::default()
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_config("{{{", ConfigFormat::Json),
            Err(GraphError::ConfigParse(_))
        ));
        assert!(matches!(
            parse_config("[[[bad", ConfigFormat::Toml),
            Err(GraphError::ConfigParse(_))
        ));
        assert!(matches!(
            parse_config("nodes: [", ConfigFormat::Yaml),
            Err(GraphError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validate_node_names() {
        let dup = r#"{"nodes":[{"name":"a"},{"name":"a"}]}"#;
        assert!(matches!(
            parse_config(dup, ConfigFormat::Json),
            Err(GraphError::InvalidConfig(_))
        ));
        let blank = r#"{"nodes":[{"name":"  "}]}"#;
        assert!(matches!(
            parse_config(blank, ConfigFormat::Json),
            Err(GraphError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_markers() {
        let cases = [
            r#"{"format":{"separator":""}}"#,
            r#"{"format":{"separator":"=== end ==="}}"#,
            r#"{"format":{"begin_marker":"a\nb"}}"#,
            r#"{"format":{"separator":"@@"}}"#,
            r#"{"format":{"separator":"-|"}}"#,
            r#"{"format":{"end_marker":" -> done"}}"#,
            r#"{"format":{"begin_marker":"->"}}"#,
        ];
        for case in cases {
            assert!(
                matches!(
                    parse_config(case, ConfigFormat::Json),
                    Err(GraphError::InvalidConfig(_))
                ),
                "expected rejection: {}",
                case
            );
        }
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ConfigFormat::from_extension("YML"), Some(ConfigFormat::Yaml));
        assert_eq!(ConfigFormat::from_extension("ini"), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.toml");
        std::fs::write(&path, "[[nodes]]\nname = \"choice\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.node_names(), vec!["choice"]);

        let missing = dir.path().join("missing.json");
        assert!(matches!(load_config(&missing), Err(GraphError::Io(_))));

        let unknown = dir.path().join("graph.ini");
        assert!(matches!(load_config(&unknown), Err(GraphError::ConfigParse(_))));
    }
}
