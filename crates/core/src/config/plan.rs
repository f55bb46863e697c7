//! The merged build plan handed to the engine

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Value, json};
use std::path::PathBuf;

use super::settings::BuildSettings;
use crate::{
    error::{Error, Result},
    types::{DEFAULT_SOURCE_PROJECTION, ProjectionSpec},
};

pub const DEFAULT_CONFIG_VERSION: &str = "1.0";

/// Every projection and global setting for one build invocation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub version: String,
    pub projections: Vec<ProjectionSpec>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub plugins: IndexMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    pub source_projection: String,
    pub format: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub maven_dependencies: Vec<String>,
}

impl Default for BuildPlan {
    fn default() -> Self {
        Self {
            version: DEFAULT_CONFIG_VERSION.to_string(),
            projections: vec![ProjectionSpec::default_source()],
            plugins: IndexMap::new(),
            output_directory: None,
            source_projection: DEFAULT_SOURCE_PROJECTION.to_string(),
            format: true,
            imports: Vec::new(),
            maven_dependencies: Vec::new(),
        }
    }
}

impl BuildPlan {
    pub fn projection(&self, name: &str) -> Option<&ProjectionSpec> {
        self.projections.iter().find(|p| p.name == name)
    }

    /// The projection flagged as source
    pub fn source(&self) -> Option<&ProjectionSpec> {
        self.projections.iter().find(|p| p.is_source)
    }

    /// Projections the engine actually builds
    pub fn buildable(&self) -> impl Iterator<Item = &ProjectionSpec> {
        self.projections.iter().filter(|p| !p.is_abstract)
    }

    /// Look up a projection that is allowed to be built or staged by name
    pub fn require_buildable(&self, name: &str) -> Result<&ProjectionSpec> {
        match self.projection(name) {
            Some(p) if p.is_abstract => Err(Error::AbstractProjection(name.to_string())),
            Some(p) => Ok(p),
            None => Err(Error::UnknownProjection(name.to_string())),
        }
    }

    /// Apply explicit host settings on top of the file-based plan
    pub fn apply_settings(&mut self, settings: &BuildSettings) -> Result<()> {
        if let Some(dir) = &settings.output_directory {
            self.output_directory = Some(dir.clone());
        }
        if let Some(format) = settings.format {
            self.format = format;
        }
        if let Some(source) = &settings.source_projection {
            self.select_source(source)?;
        }
        Ok(())
    }

    /// Mark `name` as the only source projection.
    ///
    /// The default `source` projection is synthesized when missing; any
    /// other missing name is an error.
    pub(crate) fn select_source(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::EmptyProjectionName);
        }
        if self.projection(name).is_none() {
            if name != DEFAULT_SOURCE_PROJECTION {
                return Err(Error::UnknownProjection(name.to_string()));
            }
            self.projections.insert(0, ProjectionSpec::default_source());
        }
        self.require_buildable(name)?;

        for projection in &mut self.projections {
            projection.is_source = projection.name == name;
        }
        self.source_projection = name.to_string();
        Ok(())
    }

    /// Render the plan as a single engine build config
    pub fn to_engine_config(&self) -> Value {
        let mut projections = serde_json::Map::new();
        for projection in &self.projections {
            let entry = projection.to_engine_json();
            // The engine always builds the plain source projection itself
            if projection.name == DEFAULT_SOURCE_PROJECTION && entry == json!({}) {
                continue;
            }
            projections.insert(projection.name.clone(), entry);
        }

        let mut config = serde_json::Map::new();
        config.insert("version".to_string(), json!(self.version));
        if !self.imports.is_empty() {
            config.insert("imports".to_string(), json!(self.imports));
        }
        if !projections.is_empty() {
            config.insert("projections".to_string(), Value::Object(projections));
        }
        if !self.plugins.is_empty() {
            let plugins = self
                .plugins
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            config.insert("plugins".to_string(), Value::Object(plugins));
        }
        if !self.maven_dependencies.is_empty() {
            config.insert(
                "maven".to_string(),
                json!({ "dependencies": self.maven_dependencies }),
            );
        }
        Value::Object(config)
    }
}
