use anyhow::Result;
use std::path::Path;

use crate::cli::BuildArgs;
use crate::context::ProjectContext;

pub fn plan_command(project_dir: Option<&Path>, args: &BuildArgs, engine_config: bool) -> Result<()> {
    let context = ProjectContext::load(project_dir)?;
    let request = context.request(args)?;
    let projector = context.projector(args);

    let plan = projector.plan(&request)?;
    let output = if engine_config {
        serde_json::to_string_pretty(&plan.to_engine_config())?
    } else {
        let mut value = serde_json::to_value(&plan)?;
        if let Some(object) = value.as_object_mut() {
            object.insert(
                "outputRoot".to_string(),
                serde_json::json!(projector.output_root(&request, &plan)),
            );
        }
        serde_json::to_string_pretty(&value)?
    };
    println!("{output}");
    Ok(())
}
