use anyhow::{Context, Result, bail};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::BuildArgs;
use crate::context::ProjectContext;
use crate::display::print_build_outcome;

pub fn build_command(
    project_dir: Option<&Path>,
    args: &BuildArgs,
    no_format: bool,
    json: bool,
) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let request = context.request(args)?;
    let projector = context.projector(args);

    // Fail on config problems before formatting touches any sources
    let plan = projector.plan(&request)?;
    if plan.format && !no_format {
        info!("Formatting model sources");
        projector.format(&request).context("Formatting failed")?;
    } else {
        debug!("Skipping format");
    }

    let outcome = projector.build(&request)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_build_outcome(&outcome);
    }

    if !outcome.is_success() {
        let status = outcome.status;
        let err = outcome
            .into_result()
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        bail!("Build failed ({status:?}): {err}");
    }
    Ok(())
}
