//! Merges build config documents into a single build plan
//!
//! Documents are applied in declaration order. Lists are concatenated and
//! deduplicated, projections with the same name are merged, and any two
//! different explicit values for a singular key fail the merge.

use indexmap::IndexMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::document::ConfigDocument;
use super::plan::{BuildPlan, DEFAULT_CONFIG_VERSION};
use crate::{
    error::{Error, Result},
    types::{DEFAULT_SOURCE_PROJECTION, ProjectionSpec},
    utils::fs::absolutize,
};

/// A singular setting that may be set by several documents as long as they agree
struct Singular<T> {
    key: String,
    value: Option<(T, String)>,
}

impl<T: PartialEq> Singular<T> {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    fn set(&mut self, value: Option<T>, origin: &str, render: impl Fn(&T) -> String) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        match &self.value {
            Some((existing, _)) if *existing != value => Err(Error::ConflictingConfig {
                key: self.key.clone(),
                first: render(existing),
                second: render(&value),
            }),
            Some((_, first_origin)) => {
                debug!("`{}` in {} agrees with {}", self.key, origin, first_origin);
                Ok(())
            }
            None => {
                self.value = Some((value, origin.to_string()));
                Ok(())
            }
        }
    }

    fn into_value(self) -> Option<T> {
        self.value.map(|(value, _)| value)
    }
}

struct ProjectionEntry {
    spec: ProjectionSpec,
    is_abstract: Singular<bool>,
}

pub struct PlanMerger {
    documents: Vec<ConfigDocument>,
}

impl Default for PlanMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanMerger {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
        }
    }

    pub fn add(&mut self, document: ConfigDocument) -> &mut Self {
        self.documents.push(document);
        self
    }

    /// Load config documents in order; missing files are skipped
    pub fn load_files(&mut self, paths: &[PathBuf]) -> Result<()> {
        for path in paths {
            if !path.exists() {
                warn!("Build config {} does not exist, skipping", path.display());
                continue;
            }
            debug!("Loading build config: {:?}", path);
            self.documents.push(ConfigDocument::load_from_file(path)?);
        }
        Ok(())
    }

    pub fn documents(&self) -> &[ConfigDocument] {
        &self.documents
    }

    pub fn merge(&self) -> Result<BuildPlan> {
        merge(&self.documents)
    }
}

/// Merge documents into one plan, failing on any conflicting singular value
pub fn merge(documents: &[ConfigDocument]) -> Result<BuildPlan> {
    let mut version = Singular::new("version");
    let mut output_directory = Singular::new("outputDirectory");
    let mut source_setting = Singular::new("sourceProjection");
    let mut format = Singular::new("format");

    let mut plugins: IndexMap<String, Value> = IndexMap::new();
    let mut imports: Vec<String> = Vec::new();
    let mut maven_dependencies: Vec<String> = Vec::new();
    let mut projections: IndexMap<String, ProjectionEntry> = IndexMap::new();
    let mut flagged_sources: Vec<String> = Vec::new();

    for document in documents {
        let origin = document.origin();
        debug!("Merging build config {}", origin);

        version.set(document.version.clone(), &origin, String::clone)?;
        output_directory.set(
            document
                .output_directory
                .as_ref()
                .map(|dir| absolutize(dir, &document.base_dir)),
            &origin,
            |dir: &PathBuf| dir.display().to_string(),
        )?;
        source_setting.set(document.source_projection.clone(), &origin, String::clone)?;
        format.set(document.format, &origin, bool::to_string)?;

        merge_plugins(&mut plugins, &document.plugins, "plugins")?;
        for import in &document.imports {
            push_unique(&mut imports, resolve_import(import, &document.base_dir));
        }
        for dependency in document.maven_dependencies() {
            push_unique(&mut maven_dependencies, dependency.clone());
        }

        for (name, config) in &document.projections {
            if name.trim().is_empty() {
                return Err(Error::EmptyProjectionName);
            }

            let entry = projections
                .entry(name.clone())
                .or_insert_with(|| ProjectionEntry {
                    spec: ProjectionSpec::new(name.clone()),
                    is_abstract: Singular::new(format!("projections.{name}.abstract")),
                });

            merge_plugins(
                &mut entry.spec.plugins,
                &config.plugins,
                &format!("projections.{name}.plugins"),
            )?;
            for transform in &config.transforms {
                push_unique(&mut entry.spec.transforms, transform.clone());
            }
            for import in &config.imports {
                push_unique(
                    &mut entry.spec.imports,
                    resolve_import(import, &document.base_dir),
                );
            }
            entry
                .is_abstract
                .set(config.is_abstract, &origin, bool::to_string)?;

            if config.is_source == Some(true) {
                push_unique(&mut flagged_sources, name.clone());
            }
        }
    }

    if let [first, second, ..] = flagged_sources.as_slice() {
        return Err(Error::DuplicateSourceProjection {
            first: first.clone(),
            second: second.clone(),
        });
    }
    let flagged = flagged_sources.pop();
    let setting = source_setting.into_value();
    if let (Some(setting), Some(flagged)) = (&setting, &flagged) {
        if setting != flagged {
            return Err(Error::ConflictingConfig {
                key: "sourceProjection".to_string(),
                first: setting.clone(),
                second: flagged.clone(),
            });
        }
    }
    let source = setting
        .or(flagged)
        .unwrap_or_else(|| DEFAULT_SOURCE_PROJECTION.to_string());

    let mut plan = BuildPlan {
        version: version
            .into_value()
            .unwrap_or_else(|| DEFAULT_CONFIG_VERSION.to_string()),
        projections: projections
            .into_values()
            .map(|entry| ProjectionSpec {
                is_abstract: entry.is_abstract.into_value().unwrap_or(false),
                ..entry.spec
            })
            .collect(),
        plugins,
        output_directory: output_directory.into_value(),
        source_projection: source.clone(),
        format: format.into_value().unwrap_or(true),
        imports,
        maven_dependencies,
    };
    plan.select_source(&source)?;

    info!(
        "Merged {} build config(s) into {} projection(s), source projection `{}`",
        documents.len(),
        plan.projections.len(),
        plan.source_projection
    );
    Ok(plan)
}

/// Equal settings for the same plugin are deduplicated; different ones conflict
fn merge_plugins(
    target: &mut IndexMap<String, Value>,
    incoming: &IndexMap<String, Value>,
    key_prefix: &str,
) -> Result<()> {
    for (name, settings) in incoming {
        match target.get(name) {
            Some(existing) if existing != settings => {
                return Err(Error::ConflictingConfig {
                    key: format!("{key_prefix}.{name}"),
                    first: existing.to_string(),
                    second: settings.to_string(),
                });
            }
            Some(_) => debug!("Deduplicated plugin `{}` in {}", name, key_prefix),
            None => {
                target.insert(name.clone(), settings.clone());
            }
        }
    }
    Ok(())
}

fn resolve_import(import: &str, base_dir: &Path) -> String {
    absolutize(Path::new(import), base_dir)
        .display()
        .to_string()
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> ConfigDocument {
        ConfigDocument::parse(&value.to_string(), "/project").unwrap()
    }

    #[test]
    fn test_conflicting_output_directories() {
        let result = merge(&[
            doc(json!({"outputDirectory": "/out1"})),
            doc(json!({"outputDirectory": "/out2"})),
        ]);
        let err = result.unwrap_err();
        assert!(matches!(&err, Error::ConflictingConfig { key, .. } if key == "outputDirectory"));
        assert!(err.to_string().contains("/out1"));
        assert!(err.to_string().contains("/out2"));
    }

    #[test]
    fn test_equal_output_directories_accepted() {
        let plan = merge(&[
            doc(json!({"outputDirectory": "/out1"})),
            doc(json!({"outputDirectory": "/out1"})),
        ])
        .unwrap();
        assert_eq!(plan.output_directory, Some(PathBuf::from("/out1")));
    }

    #[test]
    fn test_relative_output_directory_resolves_against_document() {
        let plan = merge(&[doc(json!({"outputDirectory": "build/out"}))]).unwrap();
        assert_eq!(plan.output_directory, Some(PathBuf::from("/project/build/out")));
    }

    #[test]
    fn test_conflicting_format_flag() {
        let result = merge(&[doc(json!({"format": true})), doc(json!({"format": false}))]);
        assert!(matches!(result, Err(Error::ConflictingConfig { key, .. }) if key == "format"));
    }

    #[test]
    fn test_same_projection_across_documents_merges_plugins() {
        let plan = merge(&[
            doc(json!({"projections": {"external": {"plugins": {"a": {"x": 1}}}}})),
            doc(json!({"projections": {"external": {"plugins": {"b": {}, "a": {"x": 1}}}}})),
        ])
        .unwrap();

        let external = plan.projection("external").unwrap();
        assert_eq!(external.plugins.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_same_plugin_with_different_settings_conflicts() {
        let result = merge(&[
            doc(json!({"projections": {"external": {"plugins": {"a": {"x": 1}}}}})),
            doc(json!({"projections": {"external": {"plugins": {"a": {"x": 2}}}}})),
        ]);
        assert!(matches!(
            result,
            Err(Error::ConflictingConfig { key, .. }) if key == "projections.external.plugins.a"
        ));
    }

    #[test]
    fn test_imports_concatenated_and_deduplicated() {
        let plan = merge(&[
            doc(json!({"imports": ["a.smithy", "b.smithy"]})),
            doc(json!({"imports": ["b.smithy", "c.smithy"]})),
        ])
        .unwrap();
        assert_eq!(
            plan.imports,
            vec!["/project/a.smithy", "/project/b.smithy", "/project/c.smithy"]
        );
    }

    #[test]
    fn test_empty_projection_name_rejected() {
        let result = merge(&[doc(json!({"projections": {"": {}}}))]);
        assert!(matches!(result, Err(Error::EmptyProjectionName)));
    }

    #[test]
    fn test_two_flagged_sources_rejected() {
        let result = merge(&[
            doc(json!({"projections": {"a": {"source": true}}})),
            doc(json!({"projections": {"b": {"source": true}}})),
        ]);
        assert!(matches!(
            result,
            Err(Error::DuplicateSourceProjection { first, second }) if first == "a" && second == "b"
        ));
    }

    #[test]
    fn test_single_flagged_source_recorded() {
        let plan = merge(&[doc(json!({"projections": {"a": {"source": true}, "b": {}}}))]).unwrap();
        assert_eq!(plan.source_projection, "a");
        assert_eq!(plan.source().unwrap().name, "a");
        assert!(plan.projection(DEFAULT_SOURCE_PROJECTION).is_none());
    }

    #[test]
    fn test_flag_disagreeing_with_setting_conflicts() {
        let result = merge(&[doc(json!({
            "sourceProjection": "b",
            "projections": {"a": {"source": true}, "b": {}}
        }))]);
        assert!(matches!(result, Err(Error::ConflictingConfig { key, .. }) if key == "sourceProjection"));
    }

    #[test]
    fn test_unknown_source_projection_setting() {
        let result = merge(&[doc(json!({"sourceProjection": "missing"}))]);
        assert!(matches!(result, Err(Error::UnknownProjection(name)) if name == "missing"));
    }

    #[test]
    fn test_abstract_source_projection_setting() {
        let result = merge(&[doc(json!({
            "sourceProjection": "base",
            "projections": {"base": {"abstract": true}}
        }))]);
        assert!(matches!(result, Err(Error::AbstractProjection(_))));
    }

    #[test]
    fn test_no_documents_yields_default_plan() {
        let plan = merge(&[]).unwrap();
        assert_eq!(plan, BuildPlan::default());
    }

    #[test]
    fn test_maven_dependencies_deduplicated() {
        let plan = merge(&[
            doc(json!({"maven": {"dependencies": ["g:a:1"]}})),
            doc(json!({"maven": {"dependencies": ["g:a:1", "g:b:1"]}})),
        ])
        .unwrap();
        assert_eq!(plan.maven_dependencies, vec!["g:a:1", "g:b:1"]);
    }

    #[test]
    fn test_merger_skips_missing_files() {
        let temp = tempfile::TempDir::new().unwrap();
        let present = temp.path().join("smithy-build.json");
        std::fs::write(&present, r#"{"projections": {"a": {}}}"#).unwrap();

        let mut merger = PlanMerger::new();
        merger
            .load_files(&[temp.path().join("missing.json"), present])
            .unwrap();
        assert_eq!(merger.documents().len(), 1);
        let plan = merger.merge().unwrap();
        assert!(plan.projection("a").is_some());
    }
}
