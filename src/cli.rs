//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{
    autoformat::AutoformatCommand, cmake_gen::CmakeGenCommand,
    collect_sources::CollectSourcesCommand, setup::SetupCommand,
    show_config::ShowConfigCommand, GlobalOptions,
};
use crate::config::resolver::DEFAULT_MAX_PASSES;
use crate::config::ResolveMode;
use crate::utils::terminal::Printer;

/// Tavros project tools
///
/// Resolves env.toml, formats sources with clang-format, regenerates
/// CMakeSources.txt manifests and generates CMake projects.
#[derive(Parser, Debug)]
#[command(name = "tavros")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Project root (default: nearest directory containing env.toml)
    #[arg(long, global = true, env = "TAVROS_ROOT")]
    pub root: Option<PathBuf>,

    /// Fail when a ${...} reference cannot be resolved
    #[arg(long, global = true)]
    pub strict: bool,

    /// Maximum number of ${...} resolution passes
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_PASSES)]
    pub max_passes: usize,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create env.toml for this project
    Setup(SetupCommand),

    /// Autoformat all source code files
    Autoformat(AutoformatCommand),

    /// Collect source code files into CMakeSources.txt
    CollectSources(CollectSourcesCommand),

    /// Generate CMake project for the given generator
    CmakeGen(CmakeGenCommand),

    /// Show the resolved configuration file
    ShowConfig(ShowConfigCommand),
}

impl Cli {
    /// Options threaded into every command
    pub fn global_options(&self) -> GlobalOptions {
        GlobalOptions {
            verbose: self.verbose,
            printer: Printer::from_flag(self.no_color),
            root: self.root.clone(),
            resolve_mode: if self.strict {
                ResolveMode::Strict
            } else {
                ResolveMode::Lenient
            },
            max_passes: self.max_passes,
        }
    }

    /// Execute the CLI command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        match self.command {
            Commands::Setup(cmd) => cmd.execute(opts),
            Commands::Autoformat(cmd) => cmd.execute(opts),
            Commands::CollectSources(cmd) => cmd.execute(opts),
            Commands::CmakeGen(cmd) => cmd.execute(opts),
            Commands::ShowConfig(cmd) => cmd.execute(opts),
        }
    }
}
