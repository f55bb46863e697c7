//! Build config documents (`smithy-build.json` style)

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::{
    error::{Error, Result},
    utils::json::strip_comments,
};

/// Default name of a build config document
pub const BUILD_CONFIG_FILE: &str = "smithy-build.json";

/// One parsed config document, before merging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub projections: IndexMap<String, ProjectionConfig>,
    /// Plugins applied to every projection
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maven: Option<MavenConfig>,

    /// File the document was read from, if any
    #[serde(skip)]
    pub path: Option<PathBuf>,
    /// Directory that relative paths in this document resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Projection entry inside a config document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub is_abstract: Option<bool>,
    /// Marks this projection as the canonical source projection
    #[serde(default, rename = "source", skip_serializing_if = "Option::is_none")]
    pub is_source: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MavenConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<Value>,
}

impl ConfigDocument {
    /// Parse document text; comments are allowed
    pub fn parse(contents: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let mut document: ConfigDocument = serde_json::from_str(&strip_comments(contents))?;
        document.base_dir = base_dir.into();
        Ok(document)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let mut document = Self::parse(&contents, base_dir).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Label used in log lines and conflict messages
    pub fn origin(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline config>".to_string())
    }

    pub fn maven_dependencies(&self) -> &[String] {
        self.maven
            .as_ref()
            .map(|m| m.dependencies.as_slice())
            .unwrap_or_default()
    }
}
