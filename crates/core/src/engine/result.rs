//! Structured outcome of one engine invocation

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::traits::EngineExit;
use crate::error::{Error, Result};
use crate::types::Diagnostic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectionOutcome {
    Success,
    ValidationFailure,
    PluginFailure,
}

impl ProjectionOutcome {
    /// Plugin failures win over validation failures
    pub fn from_diagnostics(diagnostics: &[Diagnostic]) -> Self {
        let failures = diagnostics.iter().filter(|d| d.is_failure());
        let mut outcome = ProjectionOutcome::Success;
        for diagnostic in failures {
            if diagnostic.plugin.is_some() {
                return ProjectionOutcome::PluginFailure;
            }
            outcome = ProjectionOutcome::ValidationFailure;
        }
        outcome
    }
}

impl fmt::Display for ProjectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionOutcome::Success => write!(f, "success"),
            ProjectionOutcome::ValidationFailure => write!(f, "validation failure"),
            ProjectionOutcome::PluginFailure => write!(f, "plugin failure"),
        }
    }
}

/// What one projection left behind in the output root
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub name: String,
    pub directory: PathBuf,
    pub outcome: ProjectionOutcome,
    /// Merged and validated model, when the engine wrote one
    pub model: Option<PathBuf>,
    pub diagnostics: Vec<Diagnostic>,
    /// Plugin name to plugin output directory
    pub plugins: BTreeMap<String, PathBuf>,
}

impl ProjectionResult {
    pub fn is_success(&self) -> bool {
        self.outcome == ProjectionOutcome::Success
    }

    pub fn plugin_directory(&self, plugin: &str) -> Option<&Path> {
        self.plugins.get(plugin).map(PathBuf::as_path)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub output_root: PathBuf,
    pub source_projection: String,
    pub exit: EngineExit,
    pub projections: Vec<ProjectionResult>,
}

impl BuildResult {
    pub fn projection(&self, name: &str) -> Option<&ProjectionResult> {
        self.projections.iter().find(|p| p.name == name)
    }

    pub fn source(&self) -> Option<&ProjectionResult> {
        self.projection(&self.source_projection)
    }

    pub fn projection_directory(&self, name: &str) -> Option<&Path> {
        self.projection(name).map(|p| p.directory.as_path())
    }

    pub fn plugin_directory(&self, projection: &str, plugin: &str) -> Option<&Path> {
        self.projection(projection)
            .and_then(|p| p.plugin_directory(plugin))
    }

    pub fn failed_projections(&self) -> impl Iterator<Item = &ProjectionResult> {
        self.projections.iter().filter(|p| !p.is_success())
    }

    /// Every diagnostic, tagged with its projection
    pub fn diagnostics(&self) -> impl Iterator<Item = (&str, &Diagnostic)> {
        self.projections
            .iter()
            .flat_map(|p| p.diagnostics.iter().map(move |d| (p.name.as_str(), d)))
    }

    pub fn is_success(&self) -> bool {
        self.exit.is_success() && self.failed_projections().next().is_none()
    }

    /// Turn a failed build into `Error::EngineFailed`, keeping successes as-is
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(Error::EngineFailed(self.failure_summary()))
    }

    pub fn failure_summary(&self) -> String {
        let failed: Vec<String> = self
            .failed_projections()
            .map(|p| {
                let count = p.diagnostics.iter().filter(|d| d.is_failure()).count();
                format!("{} ({}, {} error(s))", p.name, p.outcome, count)
            })
            .collect();

        match (failed.is_empty(), self.exit.code) {
            (true, Some(code)) => format!("engine exited with status {code}"),
            (true, None) => "engine was terminated".to_string(),
            (false, _) => format!("failed projections: {}", failed.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;

    fn projection(name: &str, diagnostics: Vec<Diagnostic>) -> ProjectionResult {
        ProjectionResult {
            name: name.to_string(),
            directory: PathBuf::from("/out").join(name),
            outcome: ProjectionOutcome::from_diagnostics(&diagnostics),
            model: None,
            diagnostics,
            plugins: BTreeMap::new(),
        }
    }

    #[test]
    fn test_outcome_from_diagnostics() {
        let warning = Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error("just a warning")
        };
        assert_eq!(
            ProjectionOutcome::from_diagnostics(&[warning]),
            ProjectionOutcome::Success
        );
        assert_eq!(
            ProjectionOutcome::from_diagnostics(&[Diagnostic::error("bad")]),
            ProjectionOutcome::ValidationFailure
        );
        let plugin_error = Diagnostic {
            plugin: Some("openapi".to_string()),
            ..Diagnostic::error("boom")
        };
        assert_eq!(
            ProjectionOutcome::from_diagnostics(&[Diagnostic::error("bad"), plugin_error]),
            ProjectionOutcome::PluginFailure
        );
    }

    #[test]
    fn test_failure_keeps_every_projection() {
        let result = BuildResult {
            output_root: PathBuf::from("/out"),
            source_projection: "source".to_string(),
            exit: EngineExit::failure(1),
            projections: vec![
                projection("source", vec![]),
                projection("a", vec![Diagnostic::error("bad")]),
                projection("b", vec![Diagnostic::error("worse")]),
            ],
        };

        assert!(!result.is_success());
        assert_eq!(result.failed_projections().count(), 2);
        assert_eq!(result.diagnostics().count(), 2);
        let err = result.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Model build failed: failed projections: a (validation failure, 1 error(s)), \
             b (validation failure, 1 error(s))"
        );
    }

    #[test]
    fn test_nonzero_exit_without_diagnostics_fails() {
        let result = BuildResult {
            output_root: PathBuf::from("/out"),
            source_projection: "source".to_string(),
            exit: EngineExit::failure(2),
            projections: vec![projection("source", vec![])],
        };
        assert_eq!(result.failure_summary(), "engine exited with status 2");
        assert!(result.into_result().is_err());
    }
}
