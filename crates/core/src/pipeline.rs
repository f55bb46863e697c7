//! Drives one build: resolve sources, merge the plan, run the engine, validate

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::{
    config::{BuildPlan, BuildSettings, ConfigDocument, PlanMerger, default_output_directory},
    engine::{BuildInvoker, BuildResult, EngineExit, InvokeOptions, ModelEngine, SelectQuery},
    error::{Error, Result},
    sources::{DependencyArtifact, SourceSetResolver},
    staging::Stager,
    types::{SourceLocation, TagFilter},
    validate::{RuntimeDependencyValidator, UnresolvedReferenceReport},
};

/// Plugin directory holding the models a projection publishes
pub const SOURCES_PLUGIN: &str = "sources";

/// Everything one build needs, supplied by the host
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub project_dir: PathBuf,
    pub project_name: Option<String>,
    /// Declared local roots; empty means the default roots
    pub sources: Vec<PathBuf>,
    pub use_default_roots: bool,
    pub artifacts: Vec<DependencyArtifact>,
    pub tag_filter: TagFilter,
    /// Config documents in precedence order
    pub configs: Vec<ConfigDocument>,
    pub settings: BuildSettings,
    /// Falls back to the plan's output directory, then the project default
    pub output_root: Option<PathBuf>,
    pub model_discovery_classpath: Vec<PathBuf>,
    pub plugin_classpath: Vec<PathBuf>,
    pub runtime_classpath: Vec<PathBuf>,
    pub options: InvokeOptions,
}

impl BuildRequest {
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            project_name: None,
            sources: Vec::new(),
            use_default_roots: true,
            artifacts: Vec::new(),
            tag_filter: TagFilter::default(),
            configs: Vec::new(),
            settings: BuildSettings::default(),
            output_root: None,
            model_discovery_classpath: Vec::new(),
            plugin_classpath: Vec::new(),
            runtime_classpath: Vec::new(),
            options: InvokeOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStatus {
    Success,
    /// The engine or a projection reported failure-level diagnostics
    EngineFailure,
    /// The engine succeeded but the source projection cannot be resolved by consumers
    ContractViolation,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutcome {
    pub status: BuildStatus,
    pub plan: BuildPlan,
    pub sources: Vec<SourceLocation>,
    pub result: BuildResult,
    pub report: UnresolvedReferenceReport,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Success
    }

    /// Surface engine failures and contract violations as errors
    pub fn into_result(self) -> Result<BuildResult> {
        match self.status {
            BuildStatus::Success => Ok(self.result),
            BuildStatus::EngineFailure => Err(Error::EngineFailed(self.result.failure_summary())),
            BuildStatus::ContractViolation => Err(Error::UnresolvedReferences(self.report)),
        }
    }
}

pub struct Projector<E: ModelEngine> {
    engine: E,
    validator: RuntimeDependencyValidator,
}

impl<E: ModelEngine> Projector<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            validator: RuntimeDependencyValidator::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn resolve(&self, request: &BuildRequest) -> Result<Vec<SourceLocation>> {
        let mut resolver = SourceSetResolver::new(&request.project_dir);
        if !request.use_default_roots {
            resolver = resolver.without_default_roots();
        }
        resolver.resolve(&request.sources, &request.artifacts, &request.tag_filter)
    }

    /// Merge config documents, then apply explicit settings on top
    pub fn plan(&self, request: &BuildRequest) -> Result<BuildPlan> {
        let mut merger = PlanMerger::new();
        for document in &request.configs {
            merger.add(document.clone());
        }
        let mut plan = merger.merge()?;
        plan.apply_settings(&request.settings)?;
        Ok(plan)
    }

    pub fn output_root(&self, request: &BuildRequest, plan: &BuildPlan) -> PathBuf {
        request
            .output_root
            .clone()
            .or_else(|| plan.output_directory.clone())
            .unwrap_or_else(|| {
                default_output_directory(&request.project_dir, request.project_name.as_deref())
            })
    }

    /// Run the engine's formatter over the request's local sources
    pub fn format(&self, request: &BuildRequest) -> Result<EngineExit> {
        let sources = self.resolve(request)?;
        BuildInvoker::new(&self.engine).format(&sources, &request.options)
    }

    pub fn build(&self, request: &BuildRequest) -> Result<BuildOutcome> {
        let sources = self.resolve(request)?;
        let plan = self.plan(request)?;
        let output_root = self.output_root(request, &plan);
        debug!("Output root: {}", output_root.display());

        let options = InvokeOptions {
            projection_source_tags: request.tag_filter.tags().iter().cloned().collect(),
            ..request.options.clone()
        };
        let result = BuildInvoker::new(&self.engine).invoke(
            &sources,
            &plan,
            &request.model_discovery_classpath,
            &request.plugin_classpath,
            &output_root,
            &options,
        )?;

        let (status, report) = if result.is_success() {
            let report = self.validate(&result, &request.runtime_classpath)?;
            if report.is_empty() {
                (BuildStatus::Success, report)
            } else {
                (BuildStatus::ContractViolation, report)
            }
        } else {
            warn!("Build failed: {}", result.failure_summary());
            (BuildStatus::EngineFailure, UnresolvedReferenceReport::default())
        };

        info!("Build finished: {:?}", status);
        Ok(BuildOutcome {
            status,
            plan,
            sources,
            result,
            report,
        })
    }

    /// Run the engine's `select` command over the request's sources
    pub fn select(&self, request: &BuildRequest, query: &SelectQuery) -> Result<EngineExit> {
        let sources = self.resolve(request)?;
        BuildInvoker::new(&self.engine).select(
            &sources,
            &request.model_discovery_classpath,
            &request.plugin_classpath,
            query,
            &request.options,
        )
    }

    /// Check the source projection's model against the runtime classpath.
    ///
    /// A source projection without a model cannot be checked and is an error.
    pub fn validate(
        &self,
        result: &BuildResult,
        runtime_classpath: &[PathBuf],
    ) -> Result<UnresolvedReferenceReport> {
        let Some(model) = result.source().and_then(|p| p.model.as_deref()) else {
            return Err(Error::MissingSourceModel {
                projection: result.source_projection.clone(),
                directory: result.output_root.join(&result.source_projection),
            });
        };
        self.validator.validate(model, runtime_classpath)
    }

    /// Stage a built projection's published models
    pub fn stage(
        &self,
        outcome: &BuildOutcome,
        stager: &Stager,
        projection: &str,
        include: Option<&[String]>,
    ) -> Result<PathBuf> {
        self.stage_from(&outcome.plan, &outcome.result.output_root, stager, projection, include)
    }

    /// Stage from an output root written by an earlier build of `plan`.
    ///
    /// The projection's `sources` plugin output is staged when present,
    /// otherwise the whole projection directory.
    pub fn stage_from(
        &self,
        plan: &BuildPlan,
        output_root: &Path,
        stager: &Stager,
        projection: &str,
        include: Option<&[String]>,
    ) -> Result<PathBuf> {
        let directory = output_root.join(projection);
        match plan.projection(projection) {
            Some(spec) if spec.is_abstract => {
                return Err(Error::AbstractProjection(projection.to_string()));
            }
            Some(_) => {}
            None => {
                return Err(Error::ProjectionNotBuilt {
                    projection: projection.to_string(),
                    path: directory,
                });
            }
        }

        let sources = directory.join(SOURCES_PLUGIN);
        let from = if sources.is_dir() { sources } else { directory };
        stager.stage(&from, projection, include)
    }
}
