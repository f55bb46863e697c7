use anyhow::Result;
use std::path::Path;

use projector_core::Stager;

use crate::cli::BuildArgs;
use crate::context::ProjectContext;

pub fn stage_command(
    project_dir: Option<&Path>,
    args: &BuildArgs,
    projection: &str,
    include: &[String],
    staging_dir: Option<&Path>,
) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let request = context.request(args)?;
    let projector = context.projector(args);

    let plan = projector.plan(&request)?;
    let output_root = projector.output_root(&request, &plan);
    let staging_root = staging_dir
        .map(Path::to_path_buf)
        .unwrap_or_else(|| context.project_dir.join("build").join("smithy-staging"));
    let stager = Stager::new(staging_root).with_tags(context.artifact_tags());

    let include = (!include.is_empty()).then_some(include);
    let staged = projector.stage_from(&plan, &output_root, &stager, projection, include)?;
    println!("{}", staged.display());
    Ok(())
}
