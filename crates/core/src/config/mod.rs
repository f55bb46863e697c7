//! Build configuration: config documents, project settings and the merged plan

pub mod document;
pub mod merge;
pub mod plan;
pub mod settings;

pub use document::{BUILD_CONFIG_FILE, ConfigDocument, MavenConfig, ProjectionConfig};
pub use merge::{PlanMerger, merge};
pub use plan::{BuildPlan, DEFAULT_CONFIG_VERSION};
pub use settings::{BuildSettings, ProjectSettings, SETTINGS_FILE, default_output_directory};
