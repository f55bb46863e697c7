use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::document::BUILD_CONFIG_FILE;
use crate::error::{Error, Result};

/// Name of the project settings file
pub const SETTINGS_FILE: &str = "projector.json";

/// Explicit host-level settings; these win over file-based config
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildSettings {
    pub output_directory: Option<PathBuf>,
    pub source_projection: Option<String>,
    pub format: Option<bool>,
}

/// Project settings read from `projector.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    /// Build config documents, merged in this order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub configs: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,
    /// Unpacked dependency artifacts, in resolution order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projection_source_tags: Vec<String>,
    /// Tags recorded for the staged artifact
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<bool>,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub allow_unknown_traits: bool,
    /// Engine program to execute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_discovery_classpath: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugin_classpath: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub runtime_classpath: Vec<PathBuf>,
}

impl ProjectSettings {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let settings = serde_json::from_str(&contents)
            .map_err(|e| Error::ConfigError(format!("Failed to parse {}: {e}", path.display())))?;
        Ok(settings)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Walk up from `start_path` looking for a settings file
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let mut current = start_path;

        loop {
            let config_path = current.join(SETTINGS_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            current = current.parent()?;
        }
    }

    /// Config documents to merge, defaulting to `smithy-build.json`
    pub fn config_paths(&self, project_dir: &Path) -> Vec<PathBuf> {
        if self.configs.is_empty() {
            vec![project_dir.join(BUILD_CONFIG_FILE)]
        } else {
            self.configs.iter().map(|c| project_dir.join(c)).collect()
        }
    }

    pub fn build_settings(&self, project_dir: &Path) -> BuildSettings {
        BuildSettings {
            output_directory: self.output_directory.as_ref().map(|d| project_dir.join(d)),
            source_projection: self.source_projection.clone(),
            format: self.format,
        }
    }

    pub fn default_output_directory(&self, project_dir: &Path) -> PathBuf {
        default_output_directory(project_dir, self.name.as_deref())
    }
}

/// `build/smithyprojections/<name>` under the project directory; the
/// directory name stands in for a missing project name
pub fn default_output_directory(project_dir: &Path, name: Option<&str>) -> PathBuf {
    let name = name
        .map(str::to_string)
        .or_else(|| {
            project_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "project".to_string());
    project_dir.join("build").join("smithyprojections").join(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_file_walks_up() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();
        let settings_path = temp.path().join(SETTINGS_FILE);
        ProjectSettings::default().save_to_file(&settings_path).unwrap();

        assert_eq!(ProjectSettings::find_config_file(&nested), Some(settings_path));
    }

    #[test]
    fn test_settings_round_trip_camel_case() {
        let json = serde_json::json!({
            "configs": ["smithy-build.json", "extra-build.json"],
            "projectionSourceTags": ["shared"],
            "sourceProjection": "source",
            "fork": true,
            "group": "com.example",
            "runtimeClasspath": ["deps/traits"]
        });
        let settings: ProjectSettings = serde_json::from_value(json).unwrap();
        assert!(settings.fork);
        assert_eq!(settings.projection_source_tags, vec!["shared"]);
        assert_eq!(settings.runtime_classpath, vec![PathBuf::from("deps/traits")]);

        let project = Path::new("/work/app");
        assert_eq!(settings.config_paths(project).len(), 2);
    }

    #[test]
    fn test_default_output_directory() {
        let settings = ProjectSettings::default();
        assert_eq!(
            settings.default_output_directory(Path::new("/work/app")),
            PathBuf::from("/work/app/build/smithyprojections/app")
        );
        assert_eq!(
            ProjectSettings::default().config_paths(Path::new("/work/app")),
            vec![PathBuf::from("/work/app/smithy-build.json")]
        );
    }
}
