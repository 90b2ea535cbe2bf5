//! Shared helpers: PATH tool discovery, file collection, paths, terminal output

pub mod files;
pub mod paths;
pub mod terminal;
pub mod tools;
