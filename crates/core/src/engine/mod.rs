//! External model engine invocation

pub mod command;
pub mod invoker;
pub mod isolation;
pub mod process;
pub mod result;
pub mod traits;

pub use command::EngineCommand;
pub use invoker::{BuildInvoker, DIAGNOSTICS_FILE, ENGINE_CONFIG_FILE, InvokeOptions, SelectQuery};
pub use isolation::{DEPENDENCY_MODE_VAR, ExecutionMode, logging_args};
pub use process::{DEFAULT_ENGINE, ProcessEngine};
pub use result::{BuildResult, ProjectionOutcome, ProjectionResult};
pub use traits::{EngineExit, ModelEngine};
