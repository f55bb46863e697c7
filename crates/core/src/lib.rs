//! projector - a build orchestrator for model projections
//!
//! This crate provides functionality to:
//! - Resolve model sources from local roots and tagged dependency artifacts
//! - Merge build config documents into a single projection plan
//! - Run the external model engine once for every projection
//! - Check that the source projection only depends on shapes its consumers can resolve
//! - Stage built projections for packaging
pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod sources;
pub mod staging;
pub mod types;
pub mod utils;
pub mod validate;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;

// Re-export main API components
pub use config::{BuildPlan, BuildSettings, ConfigDocument, PlanMerger, ProjectSettings};
pub use engine::{
    BuildInvoker, BuildResult, EngineCommand, ExecutionMode, InvokeOptions, ModelEngine,
    ProcessEngine, SelectQuery,
};
pub use pipeline::{BuildOutcome, BuildRequest, BuildStatus, Projector};
pub use sources::{DependencyArtifact, SourceSetResolver};
pub use staging::{ArtifactTags, Stager};
pub use validate::{RuntimeDependencyValidator, UnresolvedReferenceReport};
