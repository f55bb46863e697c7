//! Runs the engine once for every projection in a plan and collects the results

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, level_filters::LevelFilter, warn};

use super::command::{EngineCommand, join_paths, path_arg};
use super::isolation::{ExecutionMode, logging_args};
use super::result::{BuildResult, ProjectionOutcome, ProjectionResult};
use super::traits::{EngineExit, ModelEngine};
use crate::{
    config::BuildPlan,
    error::{Error, Result},
    types::{Diagnostic, SourceLocation},
    utils::fs::{absolutize, list_directories},
};

/// Merged config written into the output root and handed to the engine
pub const ENGINE_CONFIG_FILE: &str = ".projector-build.json";
pub const DIAGNOSTICS_FILE: &str = "diagnostics.json";

/// Model locations inside a projection directory, in lookup order
const MODEL_FILES: &[&str] = &["model.json", "model/model.json"];
/// File stem of a model written in any other format
const MODEL_STEM: &str = "model";

/// Arguments to the engine's `select` command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectQuery {
    pub selector: String,
    /// Shape details to print, e.g. `type,file`
    pub show: Option<String>,
    /// Traits to print for each matched shape
    pub show_traits: Option<String>,
}

impl SelectQuery {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeOptions {
    pub mode: ExecutionMode,
    /// Set `SMITHY_DEPENDENCY_MODE=forbid` for the engine
    pub forbid_dependency_resolution: bool,
    pub allow_unknown_traits: bool,
    pub projection_source_tags: Vec<String>,
    pub stacktrace: bool,
    /// Overrides the level derived from the active tracing subscriber
    pub log_level: Option<LevelFilter>,
}

impl Default for InvokeOptions {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::default(),
            forbid_dependency_resolution: true,
            allow_unknown_traits: false,
            projection_source_tags: Vec::new(),
            stacktrace: false,
            log_level: None,
        }
    }
}

impl InvokeOptions {
    fn logging_args(&self) -> Vec<String> {
        logging_args(
            self.log_level.unwrap_or_else(LevelFilter::current),
            self.stacktrace,
        )
    }
}

pub struct BuildInvoker<'a, E: ModelEngine + ?Sized> {
    engine: &'a E,
}

impl<'a, E: ModelEngine + ?Sized> BuildInvoker<'a, E> {
    pub fn new(engine: &'a E) -> Self {
        Self { engine }
    }

    /// Run one build covering every projection in `plan`.
    ///
    /// Configuration problems are reported before `output_root` is touched.
    pub fn invoke(
        &self,
        sources: &[SourceLocation],
        plan: &BuildPlan,
        model_discovery_classpath: &[PathBuf],
        plugin_classpath: &[PathBuf],
        output_root: &Path,
        options: &InvokeOptions,
    ) -> Result<BuildResult> {
        self.check_configuration(plan, output_root, options)?;
        self.engine.check_available()?;

        fs::create_dir_all(output_root)?;
        let config_path = output_root.join(ENGINE_CONFIG_FILE);
        fs::write(&config_path, serde_json::to_string_pretty(&plan.to_engine_config())?)?;
        debug!("Wrote engine config to {}", config_path.display());

        let mut command = EngineCommand::new(self.engine.program())
            .arg("build")
            .option("--output", path_arg(output_root))
            .option("--config", path_arg(&config_path))
            .option("--projection-source", plan.source_projection.as_str());
        if !options.projection_source_tags.is_empty() {
            command = command.option(
                "--projection-source-tags",
                options.projection_source_tags.join(","),
            );
        }
        if options.allow_unknown_traits {
            command = command.arg("--allow-unknown-traits");
        }
        command = if model_discovery_classpath.is_empty() {
            command.arg("--discover")
        } else {
            command.option("--discover-classpath", join_paths(model_discovery_classpath))
        };
        command = command
            .args(options.logging_args())
            .args(sources.iter().map(|s| path_arg(s.path())));
        let command = options.mode.apply(
            command,
            model_discovery_classpath,
            plugin_classpath,
            options.forbid_dependency_resolution,
        );

        info!(
            "Building {} projection(s) from {} source location(s) in {} mode",
            plan.buildable().count(),
            sources.len(),
            options.mode
        );
        let exit = self.engine.run(&command)?;
        if !exit.is_success() {
            warn!("Model engine exited with {:?}", exit.code);
        }

        self.collect(plan, output_root, exit)
    }

    /// Run the engine's `format` command over local sources
    pub fn format(&self, sources: &[SourceLocation], options: &InvokeOptions) -> Result<EngineExit> {
        let local: Vec<String> = sources
            .iter()
            .filter(|s| s.is_local())
            .map(|s| path_arg(s.path()))
            .collect();
        if local.is_empty() {
            debug!("No local sources to format");
            return Ok(EngineExit::success());
        }
        self.engine.check_available()?;

        let command = EngineCommand::new(self.engine.program())
            .arg("format")
            .args(options.logging_args())
            .args(local);
        let command = options
            .mode
            .apply(command, &[], &[], options.forbid_dependency_resolution);

        let exit = self.engine.run(&command)?;
        if !exit.is_success() {
            return Err(Error::EngineFailed(format!(
                "format exited with status {:?}",
                exit.code
            )));
        }
        Ok(exit)
    }

    /// Run the engine's `select` command over every source location.
    ///
    /// Model discovery stays off; classpath models are only loaded when the
    /// discovery classpath names them explicitly.
    pub fn select(
        &self,
        sources: &[SourceLocation],
        model_discovery_classpath: &[PathBuf],
        plugin_classpath: &[PathBuf],
        query: &SelectQuery,
        options: &InvokeOptions,
    ) -> Result<EngineExit> {
        self.engine.check_available()?;

        let mut command = EngineCommand::new(self.engine.program()).arg("select");
        if !model_discovery_classpath.is_empty() {
            command = command.option("--discover-classpath", join_paths(model_discovery_classpath));
        }
        command = command
            .args(options.logging_args())
            .option("--selector", query.selector.as_str());
        if let Some(show) = &query.show {
            command = command.option("--show", show.as_str());
        }
        if let Some(traits) = &query.show_traits {
            command = command.option("--show-traits", traits.as_str());
        }
        command = command
            .arg("--")
            .args(sources.iter().map(|s| path_arg(s.path())));
        let command = options.mode.apply(
            command,
            model_discovery_classpath,
            plugin_classpath,
            options.forbid_dependency_resolution,
        );

        debug!("Selecting `{}` from {} source location(s)", query.selector, sources.len());
        let exit = self.engine.run(&command)?;
        if !exit.is_success() {
            return Err(Error::EngineFailed(format!(
                "select exited with status {:?}",
                exit.code
            )));
        }
        Ok(exit)
    }

    fn check_configuration(
        &self,
        plan: &BuildPlan,
        output_root: &Path,
        options: &InvokeOptions,
    ) -> Result<()> {
        if options.forbid_dependency_resolution && !plan.maven_dependencies.is_empty() {
            return Err(Error::ForbiddenDependencyResolution {
                mode: options.mode.to_string(),
                dependencies: plan.maven_dependencies.clone(),
            });
        }

        if let Some(configured) = &plan.output_directory {
            let cwd = std::env::current_dir()?;
            let configured = absolutize(configured, &cwd);
            let requested = absolutize(output_root, &cwd);
            if configured != requested {
                return Err(Error::ConflictingConfig {
                    key: "outputDirectory".to_string(),
                    first: configured.display().to_string(),
                    second: requested.display().to_string(),
                });
            }
        }
        Ok(())
    }

    fn collect(&self, plan: &BuildPlan, output_root: &Path, exit: EngineExit) -> Result<BuildResult> {
        let mut projections = Vec::new();

        for spec in plan.buildable() {
            let directory = output_root.join(&spec.name);
            let mut diagnostics = Vec::new();
            let mut plugins = Default::default();
            let mut model = None;

            if directory.is_dir() {
                diagnostics = read_diagnostics(&directory);
                plugins = list_directories(&directory)?;
                model = find_model(&directory)?;
            } else {
                diagnostics.push(Diagnostic::error(format!(
                    "Projection `{}` produced no output in {}",
                    spec.name,
                    output_root.display()
                )));
            }

            let outcome = ProjectionOutcome::from_diagnostics(&diagnostics);
            debug!("Projection `{}`: {}", spec.name, outcome);
            projections.push(ProjectionResult {
                name: spec.name.clone(),
                directory,
                outcome,
                model,
                diagnostics,
                plugins,
            });
        }

        Ok(BuildResult {
            output_root: output_root.to_path_buf(),
            source_projection: plan.source_projection.clone(),
            exit,
            projections,
        })
    }
}

/// The projection's model: a JSON AST at a known location first, else any `model.*` file
fn find_model(directory: &Path) -> Result<Option<PathBuf>> {
    if let Some(path) = MODEL_FILES
        .iter()
        .map(|file| directory.join(file))
        .find(|path| path.is_file())
    {
        return Ok(Some(path));
    }

    let mut candidates = Vec::new();
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_file() && path.file_stem().and_then(|s| s.to_str()) == Some(MODEL_STEM) {
            candidates.push(path);
        }
    }
    candidates.sort();
    if candidates.len() > 1 {
        debug!("Several models in {}, using {}", directory.display(), candidates[0].display());
    }
    Ok(candidates.into_iter().next())
}

/// Diagnostics from a projection directory; unreadable files become an error diagnostic
fn read_diagnostics(directory: &Path) -> Vec<Diagnostic> {
    let path = directory.join(DIAGNOSTICS_FILE);
    if !path.is_file() {
        return Vec::new();
    }
    let parsed = fs::read_to_string(&path)
        .map_err(Error::from)
        .and_then(|contents| serde_json::from_str(&contents).map_err(Error::from));
    match parsed {
        Ok(diagnostics) => diagnostics,
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            vec![Diagnostic::error(format!(
                "Unreadable diagnostics file {}: {e}",
                path.display()
            ))]
        }
    }
}
