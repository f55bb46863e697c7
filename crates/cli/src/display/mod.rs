pub mod formatter;

pub use formatter::print_build_outcome;
