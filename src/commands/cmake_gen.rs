//! Cmake-gen command implementation

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use super::autoformat::autoformat;
use super::collect_sources::collect_sources;
use super::{GlobalOptions, Project};
use crate::build::cmake::{CMakeConfig, Generator};
use crate::config::builtin::{BUILTIN_CMAKE_HOST_ARCHITECTURE, BUILTIN_CMAKE_TOOL_PATH};
use crate::config::sections::{CmakeGenSection, CMAKE_GEN_SECTION};
use crate::exec::subprocess::{CommandRunner, SystemRunner};
use crate::utils::tools::ToolLocator;

/// Generate CMake project for the given generator
#[derive(Args, Debug)]
pub struct CmakeGenCommand {
    /// Build system to generate
    #[arg(value_enum)]
    pub generator: Generator,

    /// Regenerate CMakeSources.txt before generating
    #[arg(long)]
    pub collect_sources: bool,

    /// Run clang-format over the sources before generating
    #[arg(long)]
    pub autoformat: bool,
}

impl CmakeGenCommand {
    /// Execute the cmake-gen command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let project = Project::load(opts)?;
        let runner = SystemRunner;

        if self.collect_sources {
            collect_sources(&project, &opts.printer)?;
        }
        if self.autoformat {
            autoformat(&project, &opts.printer, &runner, None)?;
        }

        let cmake = prepare(&project, &runner, self.generator)?;
        opts.printer.step(&format!("Generating {} project...", self.generator));
        cmake.configure()?;
        opts.printer.step_done(&format!("Generating {} project...", self.generator));
        opts.printer.success(&format!(
            "Project files written to {}",
            opts.printer.accent(&cmake.build_dir().display().to_string())
        ));
        Ok(())
    }
}

/// Select CMake and assemble the configure invocation from `[command.cmake_gen]`
pub fn prepare(
    project: &Project,
    runner: &dyn CommandRunner,
    generator: Generator,
) -> Result<CMakeConfig> {
    let section: CmakeGenSection = project.config.section(CMAKE_GEN_SECTION)?;
    let tool_name = match &section.tool {
        Some(tool) => tool.clone(),
        None => project.builtins.require(BUILTIN_CMAKE_TOOL_PATH)?.to_string(),
    };

    let cmake = ToolLocator::new(runner).select_tool(&tool_name, section.min_version)?;
    tracing::debug!(cmake = %cmake, "using cmake");

    let architecture = section.architecture.clone().or_else(|| {
        project
            .builtins
            .get(BUILTIN_CMAKE_HOST_ARCHITECTURE)
            .map(str::to_string)
    });

    Ok(CMakeConfig::new(
        cmake.path,
        PathBuf::from(&section.source_dir),
        PathBuf::from(&section.build_dir).join(generator.slug()),
        generator,
    )
    .architecture(architecture)
    .variables(section.definitions))
}
