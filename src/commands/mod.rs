//! Command implementations
//!
//! Each command module provides a clap-derived struct and execute method.
//! Commands that read env.toml go through [`Project::load`], which resolves
//! the document once before any command logic runs.

pub mod autoformat;
pub mod cmake_gen;
pub mod collect_sources;
pub mod setup;
pub mod show_config;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::config::{BuiltinVariables, Config, ResolveMode, VariableResolver};
use crate::error::hints;
use crate::utils::paths::{env_file, find_project_root};
use crate::utils::terminal::Printer;

/// Options shared by every subcommand
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    pub verbose: bool,
    pub printer: Printer,
    /// Explicit project root; searched upward from the cwd when absent
    pub root: Option<PathBuf>,
    pub resolve_mode: ResolveMode,
    /// Resolver pass limit
    pub max_passes: usize,
}

impl GlobalOptions {
    /// Project root without requiring env.toml to exist yet
    pub fn root_or_cwd(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => std::env::current_dir().context("Failed to get current directory"),
        }
    }

    fn project_root(&self) -> Result<PathBuf> {
        match &self.root {
            Some(root) => Ok(root.clone()),
            None => find_project_root(),
        }
    }
}

/// A loaded project: root, builtins and the env.toml document
#[derive(Debug, Clone)]
pub struct Project {
    pub root: PathBuf,
    pub builtins: BuiltinVariables,
    pub config: Config,
}

impl Project {
    /// Load env.toml and resolve every `${...}` reference
    pub fn load(opts: &GlobalOptions) -> Result<Self> {
        let mut project = Self::load_raw(opts)?;
        let report = VariableResolver::new()
            .max_passes(opts.max_passes)
            .mode(opts.resolve_mode)
            .resolve_for_config(&mut project.config, &project.builtins)
            .with_context(|| format!("Failed to resolve {}", project.config.path().display()))?;

        tracing::debug!(
            passes = report.passes,
            substitutions = report.substitutions,
            "resolved {}",
            project.config.path().display()
        );
        if !report.is_complete() {
            opts.printer.warning(&format!(
                "unresolved variables left as-is: {}",
                report
                    .unresolved
                    .iter()
                    .map(|name| format!("${{{}}}", name))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        Ok(project)
    }

    /// Load env.toml as written, without substitution
    pub fn load_raw(opts: &GlobalOptions) -> Result<Self> {
        let root = opts.project_root()?;
        let path = env_file(&root);
        if !path.is_file() {
            bail!("{} not found\n\n{}", path.display(), hints::env_toml_not_found());
        }

        let builtins = BuiltinVariables::detect(&root)?;
        let config = Config::load(&path)?;
        Ok(Self {
            root,
            builtins,
            config,
        })
    }
}
