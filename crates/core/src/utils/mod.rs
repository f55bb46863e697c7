pub mod fs;
pub mod json;
pub mod serde_helpers;
