//! CMake project generation
//!
//! This module handles invoking CMake for the configure (generate) step.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::ToolsError;
use crate::exec::subprocess::{run_checked, CommandResult};

/// IDE / build-system generators the CLI knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Generator {
    Xcode,
    VisualStudio,
    Ninja,
    Makefiles,
}

impl Generator {
    /// Name passed to `cmake -G`
    pub fn cmake_name(&self) -> &'static str {
        match self {
            Generator::Xcode => "Xcode",
            Generator::VisualStudio => "Visual Studio 17 2022",
            Generator::Ninja => "Ninja",
            Generator::Makefiles => "Unix Makefiles",
        }
    }

    /// Build subdirectory name
    pub fn slug(&self) -> &'static str {
        match self {
            Generator::Xcode => "xcode",
            Generator::VisualStudio => "visual_studio",
            Generator::Ninja => "ninja",
            Generator::Makefiles => "makefiles",
        }
    }

    /// Whether `-A <arch>` is understood by this generator
    pub fn accepts_architecture(&self) -> bool {
        matches!(self, Generator::VisualStudio)
    }
}

impl fmt::Display for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.cmake_name())
    }
}

/// CMake configuration builder
#[derive(Debug)]
pub struct CMakeConfig {
    /// CMake executable selected by the tool locator
    cmake: PathBuf,
    /// Source directory (where CMakeLists.txt is located)
    source_dir: PathBuf,
    /// Build directory
    build_dir: PathBuf,
    generator: Generator,
    /// Platform passed with `-A` (Visual Studio only)
    architecture: Option<String>,
    /// CMake variables (-D options)
    variables: Vec<(String, String)>,
}

impl CMakeConfig {
    /// Create a new CMake configuration
    pub fn new(cmake: PathBuf, source_dir: PathBuf, build_dir: PathBuf, generator: Generator) -> Self {
        Self {
            cmake,
            source_dir,
            build_dir,
            generator,
            architecture: None,
            variables: Vec::new(),
        }
    }

    /// Set the architecture; empty strings are ignored
    pub fn architecture(mut self, arch: Option<String>) -> Self {
        self.architecture = arch.filter(|a| !a.trim().is_empty());
        self
    }

    /// Set multiple CMake variables
    pub fn variables(mut self, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        self.variables.extend(vars);
        self
    }

    pub fn build_dir(&self) -> &PathBuf {
        &self.build_dir
    }

    /// Arguments of the configure invocation
    pub fn configure_args(&self) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            self.source_dir.display().to_string(),
            "-B".to_string(),
            self.build_dir.display().to_string(),
            "-G".to_string(),
            self.generator.cmake_name().to_string(),
        ];

        if let Some(arch) = &self.architecture {
            if self.generator.accepts_architecture() {
                args.push("-A".to_string());
                args.push(arch.clone());
            }
        }

        for (name, value) in &self.variables {
            args.push(format!("-D{}={}", name, value));
        }

        args
    }

    /// Full configure invocation as one line, for logs
    pub fn command_line(&self) -> String {
        let mut line = self.cmake.display().to_string();
        for arg in self.configure_args() {
            line.push(' ');
            line.push_str(&arg);
        }
        line
    }

    /// Run CMake configure step
    pub fn configure(&self) -> Result<CommandResult, ToolsError> {
        std::fs::create_dir_all(&self.build_dir).map_err(|e| {
            ToolsError::io(
                format!("Failed to create CMake build directory {}", self.build_dir.display()),
                e,
            )
        })?;

        let program = self.cmake.display().to_string();
        tracing::info!(command = %self.command_line(), "configuring");
        run_checked(&program, &self.configure_args())
    }
}
