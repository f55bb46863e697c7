//! Copies a built projection into a directory laid out for packaging

use glob::Pattern;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::tags::ArtifactTags;
use crate::{
    error::{Error, Result},
    sources::artifact::{MANIFEST_PATH, MODEL_RESOURCE_DIR, is_model_file, manifest_tags_line},
    utils::fs::copy_tree,
};

/// Metadata file written next to the staged resources
pub const PROJECTION_RECORD_FILE: &str = "projection.json";
const MODEL_MANIFEST: &str = "manifest";

/// What a packaging step needs to know about a staged projection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StagingRecord {
    pub projection: String,
    pub files: Vec<String>,
    pub tags: ArtifactTags,
}

#[derive(Debug, Clone)]
pub struct Stager {
    staging_root: PathBuf,
    tags: ArtifactTags,
}

impl Stager {
    pub fn new(staging_root: impl Into<PathBuf>) -> Self {
        Self {
            staging_root: staging_root.into(),
            tags: ArtifactTags::default(),
        }
    }

    pub fn with_tags(mut self, tags: ArtifactTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn staging_dir(&self, projection: &str) -> PathBuf {
        self.staging_root.join(format!("staging-{projection}"))
    }

    /// Copy `projection_dir` into `staging-<projection>/META-INF/smithy`.
    ///
    /// Any previous staging of the same projection is replaced.
    pub fn stage(
        &self,
        projection_dir: &Path,
        projection: &str,
        include: Option<&[String]>,
    ) -> Result<PathBuf> {
        if !projection_dir.is_dir() {
            return Err(Error::ProjectionNotBuilt {
                projection: projection.to_string(),
                path: projection_dir.to_path_buf(),
            });
        }
        let patterns = compile_patterns(include.unwrap_or_default())?;

        let staging_dir = self.staging_dir(projection);
        if staging_dir.exists() {
            debug!("Removing previous staging at {}", staging_dir.display());
            fs::remove_dir_all(&staging_dir)?;
        }
        let resources = staging_dir.join(MODEL_RESOURCE_DIR);

        let files = copy_tree(projection_dir, &resources, |relative| {
            patterns.is_empty() || patterns.iter().any(|p| p.matches(relative))
        })?;

        let manifest = resources.join(MODEL_MANIFEST);
        if !manifest.exists() {
            let models: Vec<&str> = files
                .iter()
                .filter(|f| is_model_file(Path::new(f)))
                .map(String::as_str)
                .collect();
            let mut listing = models.join("\n");
            listing.push('\n');
            fs::write(&manifest, listing)?;
        }

        if !self.tags.is_empty() {
            let jar_manifest = staging_dir.join(MANIFEST_PATH);
            if let Some(parent) = jar_manifest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(
                &jar_manifest,
                format!("Manifest-Version: 1.0\n{}\n", manifest_tags_line(self.tags.as_set())),
            )?;
        }

        let record = StagingRecord {
            projection: projection.to_string(),
            files,
            tags: self.tags.clone(),
        };
        fs::write(
            staging_dir.join(PROJECTION_RECORD_FILE),
            serde_json::to_string_pretty(&record)?,
        )?;

        info!(
            "Staged {} file(s) from projection `{}` into {}",
            record.files.len(),
            projection,
            staging_dir.display()
        );
        Ok(staging_dir)
    }
}

fn compile_patterns(include: &[String]) -> Result<Vec<Pattern>> {
    include
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}
