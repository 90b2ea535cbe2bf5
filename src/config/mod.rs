//! env.toml loading and `${...}` resolution
//!
//! # Example
//!
//! ```toml
//! [path]
//! sources = "${builtin_root}/sources"
//!
//! [command.autoformat]
//! tool = "${builtin_clang_format_tool_path}"
//! min_version = "17.0.0"
//! include = ["${path.sources}"]
//! ```
//!
//! `${builtin_*}` names come from [`BuiltinVariables`]; any other name is a
//! dotted path into the document itself.

pub mod builtin;
pub mod document;
pub mod resolver;
pub mod sections;

pub use builtin::BuiltinVariables;
pub use document::{Config, ConfigNode};
pub use resolver::{ResolveMode, VariableResolver};

/// File name of the project configuration at the project root
pub const ENV_FILE_NAME: &str = "env.toml";
