pub mod build;
pub mod format;
pub mod plan;
pub mod select;
pub mod stage;
pub mod validate;

pub use build::build_command;
pub use format::format_command;
pub use plan::plan_command;
pub use select::select_command;
pub use stage::stage_command;
pub use validate::validate_command;
