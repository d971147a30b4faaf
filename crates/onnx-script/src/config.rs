//! Extension configuration: where models may be loaded from.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Property holding the directory models are resolved against.
pub const CONF_MODEL_ROOT: &str = "onnx.modelroot";
/// Property enabling model lookup among the embedded resources. Only `"true"` enables it.
pub const CONF_CLASSPATH: &str = "onnx.classpath";

pub const ENV_MODEL_ROOT: &str = "ONNX_MODEL_ROOT";
pub const ENV_CLASSPATH: &str = "ONNX_CLASSPATH";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    pub model_root: Option<PathBuf>,
    pub classpath_enabled: bool,
}

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

impl ExtensionConfig {
    /// Reads the extension properties out of a host configuration.
    pub fn from_properties<K, V, I>(properties: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut config = ExtensionConfig::default();
        for (key, value) in properties {
            match key.as_ref() {
                CONF_MODEL_ROOT => config.model_root = Some(PathBuf::from(value.as_ref())),
                CONF_CLASSPATH => config.classpath_enabled = value.as_ref() == "true",
                _ => {}
            }
        }
        config
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let model_root = lookup(ENV_MODEL_ROOT)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let classpath_enabled = match lookup(ENV_CLASSPATH) {
            Some(value) if !value.trim().is_empty() => parse_bool(&value),
            _ => false,
        };
        ExtensionConfig {
            model_root,
            classpath_enabled,
        }
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// True when at least one model location is configured.
    pub fn loading_enabled(&self) -> bool {
        self.model_root.is_some() || self.classpath_enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn classpath_requires_exact_true() {
        let config = ExtensionConfig::from_properties([(CONF_CLASSPATH, "TRUE")]);
        assert!(!config.classpath_enabled);
        let config = ExtensionConfig::from_properties([(CONF_CLASSPATH, "true")]);
        assert!(config.classpath_enabled);
        assert!(config.loading_enabled());
    }

    #[test]
    fn properties_ignore_unrelated_keys() {
        let mut props = HashMap::new();
        props.insert("onnx.modelroot".to_string(), "/srv/models".to_string());
        props.insert("warpscript.maxops".to_string(), "1000".to_string());
        let config = ExtensionConfig::from_properties(&props);
        assert_eq!(config.model_root, Some(PathBuf::from("/srv/models")));
        assert!(!config.classpath_enabled);
    }

    #[test]
    fn env_lookup_accepts_loose_booleans() {
        let vars: HashMap<&str, &str> = [(ENV_CLASSPATH, " Yes "), (ENV_MODEL_ROOT, "")].into();
        let config = ExtensionConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert!(config.classpath_enabled);
        assert_eq!(config.model_root, None);
    }

    #[test]
    fn json_fields_default_when_missing() {
        let config = ExtensionConfig::from_json(r#"{"model_root": "models"}"#).unwrap();
        assert_eq!(config.model_root, Some(PathBuf::from("models")));
        assert!(!config.classpath_enabled);
        assert!(!ExtensionConfig::default().loading_enabled());
    }
}
