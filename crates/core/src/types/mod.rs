pub mod diagnostic;
pub mod projection;
pub mod source_location;
pub mod tag_filter;

// Re-export commonly used types
pub use diagnostic::{Diagnostic, Severity, SourceSpan};
pub use projection::{DEFAULT_SOURCE_PROJECTION, ProjectionSpec};
pub use source_location::{OriginKind, SourceLocation};
pub use tag_filter::TagFilter;
