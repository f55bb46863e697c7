use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

use projector_core::RuntimeDependencyValidator;

pub fn validate_command(model: &Path, runtime_classpath: &[PathBuf]) -> Result<()> {
    let report = RuntimeDependencyValidator::new().validate(model, runtime_classpath)?;
    if !report.is_empty() {
        bail!("{report}");
    }
    println!("All references in {} are resolvable", model.display());
    Ok(())
}
