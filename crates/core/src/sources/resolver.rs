//! Assembles the ordered list of model source roots for one build

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::artifact::DependencyArtifact;
use crate::{
    error::{Error, Result},
    types::{SourceLocation, TagFilter},
    utils::fs::resolve_path,
};

/// Conventional model directories, relative to the project directory
pub const DEFAULT_SOURCE_DIRS: &[&str] = &[
    "model",
    "src/main/smithy",
    "src/main/resources/META-INF/smithy",
];

/// Default source roots that exist under `project_dir`, in convention order
pub fn default_roots(project_dir: &Path) -> Vec<PathBuf> {
    DEFAULT_SOURCE_DIRS
        .iter()
        .map(|dir| project_dir.join(dir))
        .filter(|dir| dir.is_dir())
        .collect()
}

/// Resolves local roots and tagged dependency artifacts into source locations
#[derive(Debug, Clone)]
pub struct SourceSetResolver {
    base_dir: PathBuf,
    use_default_roots: bool,
}

impl SourceSetResolver {
    /// Relative roots are resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            use_default_roots: true,
        }
    }

    /// Disable the `model/`-style implicit roots
    pub fn without_default_roots(mut self) -> Self {
        self.use_default_roots = false;
        self
    }

    /// Local roots first (declaration order, first occurrence wins), then
    /// every artifact whose tags match `filter`, in resolution order.
    pub fn resolve(
        &self,
        local_roots: &[PathBuf],
        artifacts: &[DependencyArtifact],
        filter: &TagFilter,
    ) -> Result<Vec<SourceLocation>> {
        let roots = if local_roots.is_empty() && self.use_default_roots {
            let defaults = default_roots(&self.base_dir);
            debug!("No source roots declared, using defaults: {:?}", defaults);
            defaults
        } else {
            local_roots.to_vec()
        };

        let mut seen = HashSet::new();
        let mut locations = Vec::new();

        for root in &roots {
            let resolved = resolve_path(root, &self.base_dir);
            if !resolved.exists() {
                warn!("Skipping model source because it does not exist: {}", resolved.display());
                continue;
            }
            if !seen.insert(resolved.clone()) {
                debug!("Skipping duplicate source root: {}", resolved.display());
                continue;
            }
            locations.push(SourceLocation::local(resolved));
        }

        for artifact in artifacts {
            if !filter.matches(&artifact.tags) {
                debug!(
                    "Skipping artifact {:?}: tags {:?} do not match {:?}",
                    artifact.path,
                    artifact.tags,
                    filter.tags()
                );
                continue;
            }
            let root = resolve_path(&artifact.resource_root(), &self.base_dir);
            if !seen.insert(root.clone()) {
                debug!("Skipping duplicate artifact root: {}", root.display());
                continue;
            }
            locations.push(SourceLocation::artifact(root, artifact.tags.clone()));
        }

        if locations.is_empty() {
            return Err(Error::MissingSources);
        }

        info!(
            "Resolved {} model source location(s) ({} local)",
            locations.len(),
            locations.iter().filter(|l| l.is_local()).count()
        );
        Ok(locations)
    }
}
