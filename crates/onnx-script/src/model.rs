//! Resolution of model references given as paths.

use std::collections::HashMap;
use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::config::ExtensionConfig;

/// Source of embedded model files, looked up by relative path.
pub trait ResourceLoader: Send + Sync {
    fn load(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>>;
}

/// In-memory resource set.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: HashMap<String, Vec<u8>>,
}

impl EmbeddedResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, bytes: Vec<u8>) -> Option<Vec<u8>> {
        self.entries.insert(path.into(), bytes)
    }

    pub fn with_resource(mut self, path: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(path, bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResourceLoader for EmbeddedResources {
    fn load(&self, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.entries.get(path).cloned())
    }
}

/// Where a session should be created from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model loading from directory or classpath not enabled")]
    LoadingDisabled,

    #[error("model path does not end in '.onnx'")]
    BadExtension,

    #[error("invalid model path '{0}'")]
    InvalidPath(String),

    #[error("error loading ONNX model '{path}': {source:#}")]
    Resource {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to load ONNX model '{0}'")]
    NotFound(String),
}

/// Resolves a relative model path against the model root, then the embedded resources.
pub fn resolve_model(
    path: &str,
    config: &ExtensionConfig,
    resources: &dyn ResourceLoader,
) -> Result<ModelSource, ModelError> {
    if !config.loading_enabled() {
        return Err(ModelError::LoadingDisabled);
    }
    if !path.ends_with(".onnx") {
        return Err(ModelError::BadExtension);
    }
    if path.contains("./") || path.starts_with('/') {
        return Err(ModelError::InvalidPath(path.to_string()));
    }

    if let Some(root) = &config.model_root {
        let candidate = root.join(path);
        if candidate.exists() {
            debug!("resolved model '{path}' to {}", candidate.display());
            return Ok(ModelSource::File(candidate));
        }
    }

    if config.classpath_enabled {
        let bytes = resources.load(path).map_err(|source| ModelError::Resource {
            path: path.to_string(),
            source,
        })?;
        if let Some(bytes) = bytes {
            debug!("resolved model '{path}' from embedded resources ({} bytes)", bytes.len());
            return Ok(ModelSource::Bytes(bytes));
        }
    }

    Err(ModelError::NotFound(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classpath_only() -> ExtensionConfig {
        ExtensionConfig {
            model_root: None,
            classpath_enabled: true,
        }
    }

    #[test]
    fn nothing_enabled_is_checked_first() {
        let err = resolve_model("bad", &ExtensionConfig::default(), &EmbeddedResources::new())
            .expect_err("loading disabled");
        assert!(matches!(err, ModelError::LoadingDisabled));
    }

    #[test]
    fn path_rules() {
        let resources = EmbeddedResources::new();
        let config = classpath_only();
        assert!(matches!(
            resolve_model("model.bin", &config, &resources),
            Err(ModelError::BadExtension)
        ));
        for path in ["../up.onnx", "a/./b.onnx", "/etc/abs.onnx"] {
            assert!(
                matches!(resolve_model(path, &config, &resources), Err(ModelError::InvalidPath(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn embedded_resources_are_used_when_enabled() {
        let resources = EmbeddedResources::new().with_resource("nets/id.onnx", vec![1, 2, 3]);
        let source = resolve_model("nets/id.onnx", &classpath_only(), &resources).unwrap();
        assert_eq!(source, ModelSource::Bytes(vec![1, 2, 3]));

        let disabled = ExtensionConfig {
            model_root: Some(PathBuf::from("/nonexistent-model-root")),
            classpath_enabled: false,
        };
        assert!(matches!(
            resolve_model("nets/id.onnx", &disabled, &resources),
            Err(ModelError::NotFound(_))
        ));
    }

    #[test]
    fn model_root_takes_precedence() {
        let root = std::env::temp_dir().join(format!("onnx_script_root_{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("m.onnx"), b"onnx").unwrap();
        let config = ExtensionConfig {
            model_root: Some(root.clone()),
            classpath_enabled: true,
        };
        let resources = EmbeddedResources::new().with_resource("m.onnx", vec![0]);
        let source = resolve_model("m.onnx", &config, &resources).unwrap();
        assert_eq!(source, ModelSource::File(root.join("m.onnx")));
        std::fs::remove_dir_all(&root).unwrap();
    }
}
