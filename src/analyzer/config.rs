use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Analyzer configuration: toggles controlling which annotation families
/// are read out of doc comments. Each family can be disabled
/// independently; disabled tags are still tokenized but their content is
/// discarded.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub read_type_annotations: bool,
    pub read_magic_property_annotations: bool,
    pub read_magic_method_annotations: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            read_type_annotations: true,
            read_magic_property_annotations: true,
            read_magic_method_annotations: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn find_config(path: Option<PathBuf>, root: &Path) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(path);
        }

        let candidates = ["phpdoc_checker.yaml", "phpdoc_checker.yml"];
        for candidate in &candidates {
            let candidate_path = root.join(candidate);
            if candidate_path.is_file() {
                return Some(candidate_path);
            }
        }

        None
    }
}
