//! Dependency artifacts that carry embedded models
//!
//! Artifacts are `.jar` archives or unpacked archive directories. Tags are
//! attached when the artifact is published and live in `META-INF/MANIFEST.MF`
//! under the `Smithy-Tags` attribute; models live under `META-INF/smithy/`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::archive::{ModelArchive, is_archive};
use crate::error::Result;

pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
pub const TAGS_ATTRIBUTE: &str = "Smithy-Tags";
pub const MODEL_RESOURCE_DIR: &str = "META-INF/smithy";

/// A resolved dependency artifact and its publish-time tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyArtifact {
    pub path: PathBuf,
    pub tags: BTreeSet<String>,
}

impl DependencyArtifact {
    pub fn new<I, S>(path: impl Into<PathBuf>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Read an artifact archive or directory, picking up tags from its manifest if present
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let manifest = if is_archive(&path) {
            ModelArchive::open(&path)?.read_entry(MANIFEST_PATH)?
        } else {
            let manifest = path.join(MANIFEST_PATH);
            if manifest.is_file() {
                Some(fs::read_to_string(&manifest)?)
            } else {
                None
            }
        };

        let tags = match manifest {
            Some(manifest) => parse_manifest_tags(&manifest),
            None => {
                debug!("No manifest in artifact {:?}, assuming no tags", path);
                BTreeSet::new()
            }
        };
        Ok(Self { path, tags })
    }

    pub fn is_archive(&self) -> bool {
        is_archive(&self.path)
    }

    /// Location the engine should read models from; archives are handed over whole
    pub fn resource_root(&self) -> PathBuf {
        if self.is_archive() {
            return self.path.clone();
        }
        let models = self.path.join(MODEL_RESOURCE_DIR);
        if models.is_dir() { models } else { self.path.clone() }
    }
}

/// Extract the `Smithy-Tags` attribute from manifest text.
///
/// Manifest lines wrap at 72 bytes with continuation lines that start with a
/// single space, so continuations are joined before the attribute is read.
pub fn parse_manifest_tags(manifest: &str) -> BTreeSet<String> {
    let mut logical: Vec<String> = Vec::new();
    for line in manifest.lines() {
        let line = line.trim_end_matches('\r');
        match (line.strip_prefix(' '), logical.last_mut()) {
            (Some(continued), Some(last)) => last.push_str(continued),
            _ => logical.push(line.to_string()),
        }
    }

    logical
        .iter()
        .filter_map(|line| line.split_once(':'))
        .filter(|(key, _)| key.trim().eq_ignore_ascii_case(TAGS_ATTRIBUTE))
        .flat_map(|(_, value)| value.split(','))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Render tags as a manifest attribute line
pub fn manifest_tags_line(tags: &BTreeSet<String>) -> String {
    format!(
        "{}: {}",
        TAGS_ATTRIBUTE,
        tags.iter().cloned().collect::<Vec<_>>().join(", ")
    )
}

pub(crate) fn is_model_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("smithy") | Some("json")
    )
}
