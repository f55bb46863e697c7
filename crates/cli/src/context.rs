//! Combines `projector.json` with command-line flags into core build inputs

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

use projector_core::{
    BuildRequest, BuildSettings, DependencyArtifact, ExecutionMode, InvokeOptions, PlanMerger,
    ProcessEngine, ProjectSettings, Projector, TagFilter,
    engine::DEFAULT_ENGINE,
    staging::ArtifactTags,
};

use crate::cli::BuildArgs;

pub struct ProjectContext {
    pub project_dir: PathBuf,
    pub settings: ProjectSettings,
    cwd: PathBuf,
}

impl ProjectContext {
    /// Find the project: explicit directory, else nearest `projector.json`, else the cwd
    pub fn load(project_dir: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let start = project_dir
            .map(|dir| cwd.join(dir))
            .unwrap_or_else(|| cwd.clone());

        let (project_dir, settings) = match ProjectSettings::find_config_file(&start) {
            Some(path) if project_dir.is_none() || path.parent() == Some(start.as_path()) => {
                debug!("Using project settings from {:?}", path);
                let settings = ProjectSettings::load_from_file(&path)?;
                let dir = path.parent().map(Path::to_path_buf).unwrap_or(start);
                (dir, settings)
            }
            _ => (start, ProjectSettings::default()),
        };

        Ok(Self {
            project_dir,
            settings,
            cwd,
        })
    }

    pub fn projector(&self, args: &BuildArgs) -> Projector<ProcessEngine> {
        let program = args
            .engine
            .clone()
            .or_else(|| self.settings.engine.clone())
            .unwrap_or_else(|| DEFAULT_ENGINE.to_string());
        Projector::new(ProcessEngine::new(program))
    }

    /// Flags win over settings; relative flag paths resolve against the cwd
    pub fn request(&self, args: &BuildArgs) -> Result<BuildRequest> {
        let settings = &self.settings;
        let mut request = BuildRequest::new(&self.project_dir);
        request.project_name = settings.name.clone();

        let config_paths = if args.configs.is_empty() {
            settings.config_paths(&self.project_dir)
        } else {
            self.from_cwd(&args.configs)
        };
        let mut merger = PlanMerger::new();
        merger.load_files(&config_paths)?;
        request.configs = merger.documents().to_vec();

        request.sources = if args.sources.is_empty() {
            self.from_project(&settings.sources)
        } else {
            self.from_cwd(&args.sources)
        };

        let dependencies = if args.dependencies.is_empty() {
            self.from_project(&settings.dependencies)
        } else {
            self.from_cwd(&args.dependencies)
        };
        request.artifacts = dependencies
            .iter()
            .map(|path| {
                DependencyArtifact::from_path(path)
                    .with_context(|| format!("Failed to read dependency {}", path.display()))
            })
            .collect::<Result<_>>()?;

        request.tag_filter = if args.projection_source_tags.is_empty() {
            TagFilter::new(settings.projection_source_tags.iter().cloned())
        } else {
            TagFilter::new(args.projection_source_tags.iter().cloned())
        };

        let file_settings = settings.build_settings(&self.project_dir);
        request.settings = BuildSettings {
            output_directory: args
                .output
                .as_ref()
                .map(|dir| self.cwd.join(dir))
                .or(file_settings.output_directory),
            source_projection: args
                .source_projection
                .clone()
                .or(file_settings.source_projection),
            format: file_settings.format,
        };

        request.model_discovery_classpath = self.merged_paths(
            &settings.model_discovery_classpath,
            &args.model_discovery_classpath,
        );
        request.plugin_classpath =
            self.merged_paths(&settings.plugin_classpath, &args.plugin_classpath);
        request.runtime_classpath =
            self.merged_paths(&settings.runtime_classpath, &args.runtime_classpath);

        request.options = InvokeOptions {
            mode: ExecutionMode::from_fork(args.fork || settings.fork),
            allow_unknown_traits: args.allow_unknown_traits || settings.allow_unknown_traits,
            stacktrace: args.stacktrace,
            ..InvokeOptions::default()
        };
        Ok(request)
    }

    pub fn artifact_tags(&self) -> ArtifactTags {
        let settings = &self.settings;
        let name = settings.name.clone().unwrap_or_else(|| {
            self.project_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        ArtifactTags::for_project(
            settings.group.as_deref(),
            &name,
            settings.version.as_deref(),
            settings.tags.iter().cloned(),
        )
    }

    fn from_cwd(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths.iter().map(|p| self.cwd.join(p)).collect()
    }

    fn from_project(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        paths.iter().map(|p| self.project_dir.join(p)).collect()
    }

    fn merged_paths(&self, from_settings: &[PathBuf], from_args: &[PathBuf]) -> Vec<PathBuf> {
        let mut paths = self.from_project(from_settings);
        for path in self.from_cwd(from_args) {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }
}
