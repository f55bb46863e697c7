//! Seam between the orchestrator and the external model engine

use serde::Serialize;
use std::process::ExitStatus;

use super::command::EngineCommand;
use crate::error::Result;

/// Exit status of one engine run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineExit {
    /// `None` when the process was terminated by a signal
    pub code: Option<i32>,
}

impl EngineExit {
    pub fn success() -> Self {
        Self { code: Some(0) }
    }

    pub fn failure(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn is_success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for EngineExit {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

/// Anything that can execute an assembled engine command
pub trait ModelEngine: Send + Sync {
    /// Program name placed in front of every command
    fn program(&self) -> &str;

    /// Fail early when the engine cannot be started at all
    fn check_available(&self) -> Result<()> {
        Ok(())
    }

    /// Run the command to completion
    fn run(&self, command: &EngineCommand) -> Result<EngineExit>;
}
