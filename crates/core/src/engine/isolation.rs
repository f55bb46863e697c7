//! How the engine process is separated from the orchestrator

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

use super::command::{EngineCommand, join_paths};
use crate::impl_case_insensitive_deserialize;

/// Environment variable the engine reads to decide whether it may resolve dependencies
pub const DEPENDENCY_MODE_VAR: &str = "SMITHY_DEPENDENCY_MODE";
pub const DEPENDENCY_MODE_FORBID: &str = "forbid";

/// Variables an isolated engine process still receives
pub const ISOLATED_ENV_ALLOW_LIST: &[&str] = &["PATH", "HOME", "JAVA_HOME", "TMPDIR", "TMP", "TEMP"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Subprocess with a cleared environment and an explicit classpath
    #[default]
    Isolated,
    /// Subprocess that inherits the caller's environment
    Forked,
}

impl_case_insensitive_deserialize!(
    ExecutionMode,
    Isolated => "isolated" | "in-process",
    Forked => "forked" | "fork",
);

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionMode::Isolated => write!(f, "isolated"),
            ExecutionMode::Forked => write!(f, "forked"),
        }
    }
}

impl ExecutionMode {
    pub fn from_fork(fork: bool) -> Self {
        if fork {
            ExecutionMode::Forked
        } else {
            ExecutionMode::Isolated
        }
    }

    /// Apply environment and classpath isolation to `command`.
    ///
    /// Isolated runs see the model-discovery and plugin classpaths; forked
    /// runs only see the plugin classpath.
    pub fn apply(
        self,
        mut command: EngineCommand,
        model_discovery_classpath: &[PathBuf],
        plugin_classpath: &[PathBuf],
        forbid_dependency_resolution: bool,
    ) -> EngineCommand {
        let classpath: Vec<PathBuf> = match self {
            ExecutionMode::Isolated => {
                command = command.with_cleared_env();
                for key in ISOLATED_ENV_ALLOW_LIST {
                    if let Ok(value) = std::env::var(key) {
                        command = command.with_env(*key, value);
                    }
                }
                model_discovery_classpath
                    .iter()
                    .chain(plugin_classpath)
                    .cloned()
                    .collect()
            }
            ExecutionMode::Forked => plugin_classpath.to_vec(),
        };

        if !classpath.is_empty() {
            command = command.with_env("CLASSPATH", join_paths(&classpath));
        }
        if forbid_dependency_resolution {
            command = command.with_env(DEPENDENCY_MODE_VAR, DEPENDENCY_MODE_FORBID);
        }
        command
    }
}

/// Engine logging flags matching the active tracing level
pub fn logging_args(level: LevelFilter, stacktrace: bool) -> Vec<String> {
    let mut args = Vec::new();
    if stacktrace {
        args.push("--stacktrace".to_string());
    }

    let logging = if level == LevelFilter::OFF {
        "OFF"
    } else if level >= LevelFilter::DEBUG {
        args.push("--debug".to_string());
        return args;
    } else if level == LevelFilter::INFO {
        "INFO"
    } else if level == LevelFilter::WARN {
        "WARNING"
    } else {
        "SEVERE"
    };
    args.push("--logging".to_string());
    args.push(logging.to_string());
    args
}
