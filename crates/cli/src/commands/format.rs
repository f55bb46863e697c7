use anyhow::{Context, Result};
use std::path::Path;

use crate::cli::BuildArgs;
use crate::context::ProjectContext;

pub fn format_command(project_dir: Option<&Path>, args: &BuildArgs) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let request = context.request(args)?;
    context
        .projector(args)
        .format(&request)
        .context("Formatting failed")?;
    Ok(())
}
