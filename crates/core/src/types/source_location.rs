use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a model source location came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginKind {
    LocalDirectory,
    LocalFile,
    DependencyArtifact,
}

impl fmt::Display for OriginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OriginKind::LocalDirectory => "local directory",
            OriginKind::LocalFile => "local file",
            OriginKind::DependencyArtifact => "dependency artifact",
        };
        f.write_str(label)
    }
}

/// A single model source root handed to the engine.
///
/// Created by the resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    path: PathBuf,
    origin: OriginKind,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    tags: BTreeSet<String>,
}

impl SourceLocation {
    pub fn local(path: PathBuf) -> Self {
        let origin = if path.is_file() {
            OriginKind::LocalFile
        } else {
            OriginKind::LocalDirectory
        };
        Self {
            path,
            origin,
            tags: BTreeSet::new(),
        }
    }

    pub fn artifact(path: PathBuf, tags: BTreeSet<String>) -> Self {
        Self {
            path,
            origin: OriginKind::DependencyArtifact,
            tags,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn origin(&self) -> OriginKind {
        self.origin
    }

    /// Tags of the owning artifact; empty for local sources
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn is_local(&self) -> bool {
        self.origin != OriginKind::DependencyArtifact
    }
}
