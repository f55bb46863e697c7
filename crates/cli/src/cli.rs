use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{
    build_command, format_command, plan_command, select_command, stage_command, validate_command,
};

#[derive(Parser, Debug)]
#[command(name = "projector")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    RUST_LOG=debug    Enable debug logging")]
pub struct Cli {
    /// Project directory (defaults to the directory holding projector.json, or the current directory)
    #[arg(short = 'C', long, global = true)]
    pub project_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command that needs a build plan
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build config document; repeat to merge several (defaults to smithy-build.json)
    #[arg(long = "config", value_name = "FILE")]
    pub configs: Vec<PathBuf>,

    /// Model source root; repeat for several (defaults to model/ and friends)
    #[arg(long = "source", value_name = "PATH")]
    pub sources: Vec<PathBuf>,

    /// Dependency artifact (directory or `.jar`) carrying embedded models
    #[arg(long = "dependency", value_name = "PATH")]
    pub dependencies: Vec<PathBuf>,

    /// Only include dependency artifacts carrying one of these tags
    #[arg(long = "projection-source-tag", value_name = "TAG")]
    pub projection_source_tags: Vec<String>,

    /// Projection to treat as the source projection
    #[arg(long)]
    pub source_projection: Option<String>,

    /// Output root for projection directories
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Run the engine with an inherited environment instead of an isolated one
    #[arg(long)]
    pub fork: bool,

    #[arg(long)]
    pub allow_unknown_traits: bool,

    /// Model engine program
    #[arg(long, value_name = "PROGRAM")]
    pub engine: Option<String>,

    /// Classpath entry used to discover models during the build
    #[arg(long = "discovery-classpath", value_name = "PATH")]
    pub model_discovery_classpath: Vec<PathBuf>,

    /// Classpath entry that provides engine plugins
    #[arg(long = "plugin-classpath", value_name = "PATH")]
    pub plugin_classpath: Vec<PathBuf>,

    /// Classpath entry consumers of the source projection will have at runtime
    #[arg(long = "runtime-classpath", value_name = "PATH")]
    pub runtime_classpath: Vec<PathBuf>,

    /// Ask the engine to print stack traces
    #[arg(long)]
    pub stacktrace: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build every projection with a single engine run
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        args: BuildArgs,

        /// Skip formatting sources before the build
        #[arg(long)]
        no_format: bool,

        /// Print the build outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the merged build plan without running the engine
    Plan {
        #[command(flatten)]
        args: BuildArgs,

        /// Print the config handed to the engine instead of the plan
        #[arg(long)]
        engine_config: bool,
    },
    /// Format local model sources
    Format {
        #[command(flatten)]
        args: BuildArgs,
    },
    /// Print the shapes in the model sources that match a selector
    Select {
        #[command(flatten)]
        args: BuildArgs,

        /// Selector expression, e.g. `structure > member`
        #[arg(long)]
        selector: String,

        /// Shape details to print, e.g. `type,file`
        #[arg(long)]
        show: Option<String>,

        /// Traits to print for each matching shape
        #[arg(long)]
        show_traits: Option<String>,
    },
    /// Check a model file against a runtime classpath
    Validate {
        /// Model file produced by the source projection
        model: PathBuf,

        /// Classpath entry consumers will have at runtime
        #[arg(long = "runtime-classpath", value_name = "PATH")]
        runtime_classpath: Vec<PathBuf>,
    },
    /// Stage a built projection for packaging
    Stage {
        #[command(flatten)]
        args: BuildArgs,

        /// Projection to stage
        #[arg(default_value = "source")]
        projection: String,

        /// Only stage files matching these glob patterns
        #[arg(long = "include", value_name = "GLOB")]
        include: Vec<String>,

        /// Directory that receives staging-<projection>
        #[arg(long, value_name = "DIR")]
        staging_dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Execute the selected command
    pub fn execute(self) -> Result<()> {
        let project_dir = self.project_dir;
        match self.command {
            Commands::Build {
                args,
                no_format,
                json,
            } => build_command(project_dir.as_deref(), &args, no_format, json),
            Commands::Plan {
                args,
                engine_config,
            } => plan_command(project_dir.as_deref(), &args, engine_config),
            Commands::Format { args } => format_command(project_dir.as_deref(), &args),
            Commands::Select {
                args,
                selector,
                show,
                show_traits,
            } => select_command(project_dir.as_deref(), &args, selector, show, show_traits),
            Commands::Validate {
                model,
                runtime_classpath,
            } => validate_command(&model, &runtime_classpath),
            Commands::Stage {
                args,
                projection,
                include,
                staging_dir,
            } => stage_command(
                project_dir.as_deref(),
                &args,
                &projection,
                &include,
                staging_dir.as_deref(),
            ),
        }
    }
}
