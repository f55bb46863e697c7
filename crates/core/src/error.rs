use std::io;
use std::path::PathBuf;

use crate::validate::UnresolvedReferenceReport;

/// Errors that can occur during projector operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Conflicting values for `{key}` defined in provided build configs: {first}, {second}")]
    ConflictingConfig {
        key: String,
        first: String,
        second: String,
    },

    #[error("Projection `{0}` not found. Is this projection defined in your build config?")]
    UnknownProjection(String),

    #[error("Only one projection may be the source projection, found `{first}` and `{second}`")]
    DuplicateSourceProjection { first: String, second: String },

    #[error("Projection names must not be empty")]
    EmptyProjectionName,

    #[error("Projection `{0}` is abstract and cannot be built or staged directly")]
    AbstractProjection(String),

    #[error(
        "Dependency resolution is forbidden when running the engine in {mode} mode, \
         but the build config declares dependencies: {}",
        .dependencies.join(", ")
    )]
    ForbiddenDependencyResolution {
        mode: String,
        dependencies: Vec<String>,
    },

    #[error("Failed to parse build config {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("No model sources found: declare a source root, add a matching dependency, or create a `model/` directory")]
    MissingSources,

    #[error("Could not find model engine `{0}`")]
    EngineNotFound(String),

    #[error("Model build failed: {0}")]
    EngineFailed(String),

    #[error("{0}")]
    UnresolvedReferences(UnresolvedReferenceReport),

    #[error(
        "Source projection `{projection}` produced no model in {}; its runtime dependencies cannot be checked",
        .directory.display()
    )]
    MissingSourceModel {
        projection: String,
        directory: PathBuf,
    },

    #[error("Cannot check runtime dependencies of {}: only JSON AST models are supported", .0.display())]
    UnsupportedModelFormat(PathBuf),

    #[error("Projection `{projection}` has not been built: {} does not exist", .path.display())]
    ProjectionNotBuilt { projection: String, path: PathBuf },

    #[error("Invalid include pattern `{pattern}`: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ArchiveError(#[from] zip::result::ZipError),
}

impl Error {
    /// Whether this error was raised before the engine could run.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::ConflictingConfig { .. }
                | Error::UnknownProjection(_)
                | Error::DuplicateSourceProjection { .. }
                | Error::EmptyProjectionName
                | Error::AbstractProjection(_)
                | Error::ForbiddenDependencyResolution { .. }
                | Error::ConfigParse { .. }
                | Error::ConfigError(_)
        )
    }
}

/// Result type alias for projector operations
pub type Result<T> = std::result::Result<T, Error>;
