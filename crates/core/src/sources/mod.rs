//! Model source resolution

pub mod archive;
pub mod artifact;
pub mod resolver;

pub use archive::{ModelArchive, is_archive};
pub use artifact::{DependencyArtifact, parse_manifest_tags};
pub use resolver::{DEFAULT_SOURCE_DIRS, SourceSetResolver, default_roots};
