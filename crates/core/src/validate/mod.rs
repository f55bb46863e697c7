//! Post-build check that the source projection is resolvable by its consumers

pub mod discovery;
pub mod model;
pub mod validator;

pub use discovery::{DISCOVERY_MANIFEST, classpath_shapes};
pub use model::{ModelIndex, ReferenceKind};
pub use validator::{RuntimeDependencyValidator, UnresolvedReference, UnresolvedReferenceReport};
