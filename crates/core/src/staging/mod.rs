//! Staging of built projections for packaging

pub mod stager;
pub mod tags;

pub use stager::{PROJECTION_RECORD_FILE, Stager, StagingRecord};
pub use tags::ArtifactTags;
