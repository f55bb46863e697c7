use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::impl_case_insensitive_deserialize;

/// Severity reported by the engine for a single diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Suppressed,
    Note,
    Warning,
    Danger,
    Error,
}

impl_case_insensitive_deserialize!(
    Severity,
    Suppressed => "suppressed",
    Note => "note",
    Warning => "warning" | "warn",
    Danger => "danger",
    Error => "error",
);

impl Severity {
    /// DANGER and ERROR fail a projection
    pub fn is_failure(self) -> bool {
        self >= Severity::Danger
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Suppressed => "SUPPRESSED",
            Severity::Note => "NOTE",
            Severity::Warning => "WARNING",
            Severity::Danger => "DANGER",
            Severity::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// Position in a model file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: PathBuf,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Structured diagnostic as written by the engine into `diagnostics.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceSpan>,
    pub message: String,
    /// Set when the diagnostic was raised by a plugin rather than by validation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            id: None,
            location: None,
            message: message.into(),
            plugin: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.severity.is_failure()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity)?;
        if let Some(id) = &self.id {
            write!(f, " {id}")?;
        }
        if let Some(location) = &self.location {
            write!(f, " {location}")?;
        }
        if let Some(plugin) = &self.plugin {
            write!(f, " (plugin {plugin})")?;
        }
        write!(f, ": {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_severities() {
        assert!(!Severity::Warning.is_failure());
        assert!(Severity::Danger.is_failure());
        assert!(Severity::Error.is_failure());
    }

    #[test]
    fn test_deserialize_engine_diagnostic() {
        let diagnostic: Diagnostic = serde_json::from_value(serde_json::json!({
            "severity": "ERROR",
            "id": "Target",
            "location": { "file": "model/main.smithy", "line": 4, "column": 5 },
            "message": "Unable to resolve trait `ns#missing`"
        }))
        .unwrap();

        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(
            diagnostic.to_string(),
            "[ERROR] Target model/main.smithy:4:5: Unable to resolve trait `ns#missing`"
        );
    }
}
