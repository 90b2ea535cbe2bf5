//! Path utilities for the tavros CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::ENV_FILE_NAME;
use crate::error::hints;

/// Find the project root by looking for env.toml
pub fn find_project_root() -> Result<PathBuf> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    find_project_root_from(&current_dir)
}

/// Find the project root starting from a specific directory
pub fn find_project_root_from(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(ENV_FILE_NAME).is_file() {
            return Ok(dir.to_path_buf());
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => {
                anyhow::bail!("{}", hints::env_toml_not_found())
            }
        }
    }
}

/// Path of env.toml under a project root
pub fn env_file(project_root: &Path) -> PathBuf {
    project_root.join(ENV_FILE_NAME)
}

/// Path relative to `base`, with `/` separators on every platform
pub fn to_posix_relative(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_project_root_from_subdirectory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(ENV_FILE_NAME), "").unwrap();
        let nested = temp.path().join("sources").join("libs");
        fs::create_dir_all(&nested).unwrap();

        let root = find_project_root_from(&nested).unwrap();
        assert_eq!(root, temp.path());
    }

    #[test]
    fn test_to_posix_relative() {
        let base = Path::new("/p/libs/core");
        let file = base.join("tavros").join("core").join("math.cpp");
        assert_eq!(to_posix_relative(&file, base), "tavros/core/math.cpp");
    }
}
