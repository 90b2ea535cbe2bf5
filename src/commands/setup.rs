//! Setup command implementation
//!
//! Writes the project's env.toml from `tools/initial_config.toml` when the
//! project ships one, otherwise from the built-in template below.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use super::GlobalOptions;
use crate::config::{Config, ENV_FILE_NAME};
use crate::utils::terminal::Printer;

/// Project-provided template, relative to the project root
pub const INITIAL_CONFIG_PATH: &str = "tools/initial_config.toml";

pub const DEFAULT_TEMPLATE: &str = r#"# Tavros project environment
#
# `${builtin_*}` values are computed for the host platform at startup.
# Any other `${a.b.c}` refers to a string elsewhere in this file.

[path]
sources = "${builtin_root}/sources"
build = "${builtin_root}/build"

[command.autoformat]
tool = "${builtin_clang_format_tool_path}"
min_version = "17.0.0"
clang_format_style_file = "${builtin_root}/.clang-format"
include = ["${path.sources}"]
exclude = ["${path.sources}/wrappers"]
exts = [".h", ".hpp", ".inl", ".c", ".cpp", ".mm"]

[command.collect_sources]
collect_paths = [
    "${path.sources}/libs/core",
    "${path.sources}/libs/system",
    "${path.sources}/libs/renderer",
]
exts = [".h", ".hpp", ".inl", ".c", ".cpp", ".mm"]
test_exts = [".test.cpp"]
exclude = []

[command.collect_sources.platform_subfolders]
win32 = "platform/win32"
macos = "platform/macos"
linux = "platform/linux"

[command.cmake_gen]
tool = "${builtin_cmake_tool_path}"
min_version = "3.28.0"
source_dir = "${builtin_root}"
build_dir = "${path.build}"
architecture = "${builtin_cmake_host_architecture}"

[command.cmake_gen.definitions]
CMAKE_EXPORT_COMPILE_COMMANDS = "ON"
"#;

/// Initialize env.toml for the project
#[derive(Args, Debug)]
pub struct SetupCommand {
    /// Overwrite an existing env.toml
    #[arg(long)]
    pub force: bool,
}

impl SetupCommand {
    /// Execute the setup command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let root = opts.root_or_cwd()?;
        setup(&root, self.force, &opts.printer).map(|_| ())
    }
}

/// Write `<root>/env.toml`; returns its path
pub fn setup(root: &Path, force: bool, printer: &Printer) -> Result<PathBuf> {
    let target = root.join(ENV_FILE_NAME);
    if target.exists() && !force {
        bail!(
            "{} already exists (use `tavros setup --force` to overwrite)",
            target.display()
        );
    }

    let project_template = root.join(INITIAL_CONFIG_PATH);
    let (content, source) = if project_template.is_file() {
        let content = fs::read_to_string(&project_template)
            .with_context(|| format!("Failed to read {}", project_template.display()))?;
        (content, project_template.display().to_string())
    } else {
        (DEFAULT_TEMPLATE.to_string(), "built-in template".to_string())
    };

    // Refuse to write something later commands could not load
    Config::parse(&content, &target)?;

    fs::write(&target, &content).with_context(|| format!("Failed to write {}", target.display()))?;
    printer.success(&format!(
        "Created {} from {}",
        printer.accent(&target.display().to_string()),
        source
    ));
    Ok(target)
}
