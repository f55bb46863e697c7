use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::discovery::classpath_shapes;
use super::model::{ModelIndex, ReferenceKind};
use crate::error::{Error, Result};

/// One identifier that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    pub kind: String,
    pub referenced_by: BTreeSet<String>,
}

/// Identifiers the source projection uses that neither it nor the runtime classpath define
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnresolvedReferenceReport {
    missing: BTreeMap<String, UnresolvedReference>,
}

impl UnresolvedReferenceReport {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn len(&self) -> usize {
        self.missing.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.missing.contains_key(id)
    }

    pub fn identifiers(&self) -> BTreeSet<&str> {
        self.missing.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &UnresolvedReference)> {
        self.missing.iter()
    }

    fn add(&mut self, id: &str, kind: ReferenceKind, referenced_by: &BTreeSet<String>) {
        self.missing.insert(
            id.to_string(),
            UnresolvedReference {
                kind: kind.to_string(),
                referenced_by: referenced_by.clone(),
            },
        );
    }
}

impl fmt::Display for UnresolvedReferenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The source projection references {} identifier(s) that are not defined in the model \
             or on the runtime classpath:",
            self.missing.len()
        )?;
        for (id, reference) in &self.missing {
            let shapes = reference
                .referenced_by
                .iter()
                .map(|s| format!("`{s}`"))
                .collect::<Vec<_>>()
                .join(", ");
            let verb = if reference.kind == "trait" { "applied to" } else { "referenced by" };
            write!(f, "\n  Unable to resolve {} `{id}` {verb} {shapes}", reference.kind)?;
        }
        Ok(())
    }
}

/// Checks that the source projection only depends on shapes its consumers can resolve
#[derive(Debug, Clone, Default)]
pub struct RuntimeDependencyValidator;

impl RuntimeDependencyValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(
        &self,
        source_model: &Path,
        runtime_classpath: &[PathBuf],
    ) -> Result<UnresolvedReferenceReport> {
        if source_model.extension().and_then(|e| e.to_str()) != Some("json") {
            return Err(Error::UnsupportedModelFormat(source_model.to_path_buf()));
        }
        let index = ModelIndex::from_file(source_model)?;
        let mut report = UnresolvedReferenceReport::default();

        let external: Vec<_> = index.external_references().collect();
        if external.is_empty() {
            debug!("{} has no external references", source_model.display());
            return Ok(report);
        }

        let visible = classpath_shapes(runtime_classpath)?;
        for (id, (kind, referenced_by)) in external {
            if !visible.contains(id) {
                report.add(id, *kind, referenced_by);
            }
        }

        info!(
            "Checked {} external reference(s) against {} runtime classpath entries: {} unresolved",
            index.external_references().count(),
            runtime_classpath.len(),
            report.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write_model(dir: &Path, model: serde_json::Value) -> PathBuf {
        let path = dir.join("model.json");
        fs::write(&path, model.to_string()).unwrap();
        path
    }

    fn traits_artifact(dir: &Path, idl: &str) -> PathBuf {
        let root = dir.join("traits-artifact");
        let models = root.join("META-INF/smithy");
        fs::create_dir_all(&models).unwrap();
        fs::write(models.join("manifest"), "traits.smithy\n").unwrap();
        fs::write(models.join("traits.smithy"), idl).unwrap();
        root
    }

    #[test]
    fn test_report_contains_only_unresolvable_ids() {
        let temp = TempDir::new().unwrap();
        let model = write_model(
            temp.path(),
            json!({
                "smithy": "2.0",
                "shapes": {
                    "ns#Widget": {
                        "type": "structure",
                        "traits": {"dep#known": {}, "dep#unknown": {}}
                    }
                }
            }),
        );
        let artifact = traits_artifact(temp.path(), "namespace dep\n@trait\nstructure known {}\n");

        let report = RuntimeDependencyValidator::new()
            .validate(&model, &[artifact])
            .unwrap();
        assert_eq!(report.identifiers(), BTreeSet::from(["dep#unknown"]));
    }

    #[test]
    fn test_self_contained_model_passes() {
        let temp = TempDir::new().unwrap();
        let model = write_model(
            temp.path(),
            json!({
                "smithy": "2.0",
                "shapes": {
                    "ns#local": {"type": "structure", "traits": {"smithy.api#trait": {}}},
                    "ns#Widget": {"type": "structure", "traits": {"ns#local": {}}}
                }
            }),
        );
        let report = RuntimeDependencyValidator::new().validate(&model, &[]).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_message() {
        let temp = TempDir::new().unwrap();
        let model = write_model(
            temp.path(),
            json!({
                "smithy": "2.0",
                "shapes": {
                    "ns#Widget": {
                        "type": "structure",
                        "traits": {"ns#missingTrait": {}},
                        "members": {"part": {"target": "other#Part"}}
                    }
                }
            }),
        );
        let report = RuntimeDependencyValidator::new().validate(&model, &[]).unwrap();
        insta::assert_snapshot!(report.to_string(), @r"
        The source projection references 2 identifier(s) that are not defined in the model or on the runtime classpath:
          Unable to resolve trait `ns#missingTrait` applied to `ns#Widget`
          Unable to resolve shape `other#Part` referenced by `ns#Widget$part`
        ");
    }

    #[test]
    fn test_member_references_resolve_against_classpath() {
        let temp = TempDir::new().unwrap();
        let model = write_model(
            temp.path(),
            json!({
                "smithy": "2.0",
                "shapes": {
                    "ns#GetWidget": {
                        "type": "operation",
                        "input": {"target": "ns#Input"},
                        "errors": [{"target": "dep#Missing"}]
                    },
                    "ns#Input": {
                        "type": "structure",
                        "members": {
                            "traits": {"target": "smithy.api#String"},
                            "target": {"target": "dep#Known", "traits": {"dep#gone": {}}}
                        }
                    }
                }
            }),
        );
        let artifact = traits_artifact(temp.path(), "namespace dep\nstructure Known {}\n");

        let report = RuntimeDependencyValidator::new()
            .validate(&model, &[artifact])
            .unwrap();
        assert_eq!(report.identifiers(), BTreeSet::from(["dep#Missing", "dep#gone"]));
        let (_, gone) = report.iter().find(|(id, _)| *id == "dep#gone").unwrap();
        assert_eq!(gone.referenced_by, BTreeSet::from(["ns#Input$target".to_string()]));
    }

    #[test]
    fn test_jar_on_runtime_classpath() {
        let temp = TempDir::new().unwrap();
        let model = write_model(
            temp.path(),
            json!({
                "smithy": "2.0",
                "shapes": {"ns#Widget": {"type": "structure", "traits": {"dep#known": {}}}}
            }),
        );
        let jar = temp.path().join("traits.jar");
        crate::sources::archive::write_archive(
            &jar,
            &[
                ("META-INF/smithy/manifest", "traits.smithy\n"),
                ("META-INF/smithy/traits.smithy", "namespace dep\n@trait\nstructure known {}\n"),
            ],
        );

        let report = RuntimeDependencyValidator::new().validate(&model, &[jar]).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_idl_source_model_is_rejected() {
        let temp = TempDir::new().unwrap();
        let model = temp.path().join("model.smithy");
        fs::write(&model, "namespace ns\n@missingTrait\nstructure Widget {}\n").unwrap();

        let result = RuntimeDependencyValidator::new().validate(&model, &[]);
        assert!(matches!(result, Err(Error::UnsupportedModelFormat(_))));
    }
}
