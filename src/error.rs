//! Error types and helpers for user-friendly error messages
//!
//! Every failure the core layers can produce is a variant of [`ToolsError`],
//! so callers can branch on the kind (a missing key is not the same thing as
//! a missing field, a missing tool is not the same thing as an old one).

use std::path::PathBuf;

use thiserror::Error;

use crate::version::VersionTriple;

/// Errors surfaced by the configuration, resolver and tool layers
#[derive(Error, Debug)]
pub enum ToolsError {
    /// Dotted-path lookup miss
    #[error("No such key: {path}")]
    KeyNotFound { path: String },

    /// Field-style access miss
    #[error("No such attribute: {name}")]
    AttributeNotFound { name: String },

    /// PATH search returned nothing
    #[error("{tool} not found in PATH")]
    ToolNotFound { tool: String },

    /// Candidates exist but all of them are too old (or unprobeable)
    #[error("No {tool} >= {minimum} found in PATH (checked {checked} candidate(s))")]
    NoVersionSatisfies {
        tool: String,
        minimum: VersionTriple,
        checked: usize,
    },

    /// A `${...}` token survived every resolver pass in strict mode
    #[error("Unresolved variable `${{{name}}}`")]
    UnresolvedVariable { name: String },

    /// Non-zero exit or missing executable
    #[error("Process `{program}` failed: {message}")]
    ProcessFailure { program: String, message: String },

    /// Platform outside the builtin table, or a key the table lacks
    #[error("Unknown platform `{platform}` or missing key `{key}`")]
    UnknownPlatform { platform: String, key: String },

    /// The configuration document could not be parsed or serialized
    #[error("Invalid configuration document {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Filesystem access failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Some formatter tasks failed after the pool drained
    #[error("{failed} of {total} file(s) were not formatted")]
    FormatFailures { failed: usize, total: usize },
}

impl ToolsError {
    /// Create a process failure error
    pub fn process_failure(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcessFailure {
            program: program.into(),
            message: message.into(),
        }
    }

    /// Wrap an I/O error with a description of what was attempted
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Hint to print below the error, if there is a useful one
    pub fn hint(&self) -> Option<String> {
        match self {
            ToolsError::ToolNotFound { tool } => Some(hints::for_tool(tool).to_string()),
            ToolsError::NoVersionSatisfies { tool, minimum, .. } => Some(format!(
                "Install {} {} or newer and put it before older copies in PATH.\n{}",
                tool,
                minimum,
                hints::for_tool(tool)
            )),
            ToolsError::KeyNotFound { .. } | ToolsError::AttributeNotFound { .. } => {
                Some(hints::env_toml_invalid().to_string())
            }
            ToolsError::UnresolvedVariable { .. } => Some(hints::unresolved_variable().to_string()),
            ToolsError::ConfigParse { .. } => Some(hints::env_toml_invalid().to_string()),
            _ => None,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self, colors: bool) {
        use console::Style;

        let error_style = Style::new().red().bold().force_styling(colors);
        let hint_style = Style::new().yellow().bold().force_styling(colors);

        eprintln!("\n{} {}", error_style.apply_to("FATAL:"), self);
        if let Some(hint) = self.hint() {
            eprintln!("\n{} {}", hint_style.apply_to("HINT:"), hint);
        }
        eprintln!();
    }
}

/// Common error hints
pub mod hints {
    /// Installation hint keyed by tool name (with or without `.exe`)
    pub fn for_tool(tool: &str) -> &'static str {
        match tool.trim_end_matches(".exe") {
            "cmake" => cmake(),
            "clang-format" => clang_format(),
            _ => "Install this tool and ensure it's in your PATH",
        }
    }

    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake\n\
         • Windows: winget install Kitware.CMake"
    }

    /// Get hint for missing clang-format
    pub fn clang_format() -> &'static str {
        "Install clang-format (part of LLVM) or use your package manager:\n\
         • macOS: brew install clang-format\n\
         • Ubuntu: sudo apt install clang-format\n\
         • Windows: winget install LLVM.LLVM"
    }

    /// Get hint for env.toml not found
    pub fn env_toml_not_found() -> &'static str {
        "Could not find env.toml in current directory or any parent directory.\n\
         \n\
         To initialize the project:\n\
         • Run: tavros setup"
    }

    /// Get hint for an env.toml that is missing expected entries
    pub fn env_toml_invalid() -> &'static str {
        "env.toml is invalid or incomplete. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • A [command.*] section or key was removed\n\
         \n\
         Compare with tools/initial_config.toml or regenerate with: tavros setup --force"
    }

    /// Get hint for a variable that never resolved
    pub fn unresolved_variable() -> &'static str {
        "A ${...} reference names neither a builtin variable nor a string entry of env.toml.\n\
         Run `tavros show-config` to see which values are still unresolved."
    }
}
