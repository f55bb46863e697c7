use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::command::EngineCommand;
use super::traits::{EngineExit, ModelEngine};
use crate::error::{Error, Result};

/// Default engine program looked up on `PATH`
pub const DEFAULT_ENGINE: &str = "smithy";

/// Runs the engine as a child process
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: String,
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE)
    }
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the program to an executable path, searching `PATH` for bare names
    pub fn locate(&self) -> Option<PathBuf> {
        let program = Path::new(&self.program);
        if program.components().count() > 1 {
            return program.is_file().then(|| program.to_path_buf());
        }

        let path_var = std::env::var_os("PATH")?;
        std::env::split_paths(&path_var)
            .flat_map(|dir| candidates(&dir, &self.program))
            .find(|candidate| candidate.is_file())
    }
}

fn candidates(dir: &Path, program: &str) -> Vec<PathBuf> {
    let mut names = vec![dir.join(program)];
    if cfg!(windows) {
        names.push(dir.join(format!("{program}.exe")));
        names.push(dir.join(format!("{program}.bat")));
        names.push(dir.join(format!("{program}.cmd")));
    }
    names
}

impl ModelEngine for ProcessEngine {
    fn program(&self) -> &str {
        &self.program
    }

    fn check_available(&self) -> Result<()> {
        match self.locate() {
            Some(path) => {
                debug!("Using model engine at {}", path.display());
                Ok(())
            }
            None => Err(Error::EngineNotFound(self.program.clone())),
        }
    }

    fn run(&self, command: &EngineCommand) -> Result<EngineExit> {
        info!("Running: {}", command.to_shell_command());
        let status = command.to_process().status().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                Error::EngineNotFound(command.program.clone())
            } else {
                Error::IoError(e)
            }
        })?;
        debug!("Engine exited with {:?}", status);
        Ok(status.into())
    }
}
