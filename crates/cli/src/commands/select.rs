use anyhow::{Context, Result};
use projector_core::SelectQuery;
use std::path::Path;

use crate::cli::BuildArgs;
use crate::context::ProjectContext;

pub fn select_command(
    project_dir: Option<&Path>,
    args: &BuildArgs,
    selector: String,
    show: Option<String>,
    show_traits: Option<String>,
) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let request = context.request(args)?;
    let query = SelectQuery {
        selector,
        show,
        show_traits,
    };
    context
        .projector(args)
        .select(&request, &query)
        .with_context(|| format!("Selector `{}` failed", query.selector))?;
    Ok(())
}
