//! Builtin variables available to every `${...}` reference
//!
//! Computed once per run from the host platform and the project root.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::ToolsError;

pub const BUILTIN_ROOT: &str = "builtin_root";
pub const BUILTIN_CLANG_FORMAT_TOOL_PATH: &str = "builtin_clang_format_tool_path";
pub const BUILTIN_CMAKE_TOOL_PATH: &str = "builtin_cmake_tool_path";
pub const BUILTIN_CMAKE_HOST_GENERATOR: &str = "builtin_cmake_host_generator";
pub const BUILTIN_CMAKE_HOST_ARCHITECTURE: &str = "builtin_cmake_host_architecture";

/// Host OS family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    Macos,
}

impl Platform {
    /// Platform this binary was built for
    pub fn current() -> Result<Self, ToolsError> {
        std::env::consts::OS.parse()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Macos => "macos",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = ToolsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "windows" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" => Ok(Platform::Macos),
            other => Err(ToolsError::UnknownPlatform {
                platform: other.to_string(),
                key: "platform".to_string(),
            }),
        }
    }
}

/// Per-platform tool table
fn platform_value(platform_name: &str, key: &str) -> Result<&'static str, ToolsError> {
    let value = match (platform_name, key) {
        ("windows", "clang_format") => Some("clang-format.exe"),
        ("windows", "cmake") => Some("cmake.exe"),
        ("windows", "generator") => Some("Visual Studio 17"),
        ("windows", "arch") => Some(""),

        ("linux", "clang_format") => Some("clang-format"),
        ("linux", "cmake") => Some("cmake"),
        ("linux", "generator") => Some("Unix Makefiles"),
        ("linux", "arch") => Some(""),

        ("macos", "clang_format") => Some("clang-format"),
        ("macos", "cmake") => Some("cmake"),
        ("macos", "generator") => Some("Xcode"),
        ("macos", "arch") => Some(""),

        _ => None,
    };

    value.ok_or_else(|| ToolsError::UnknownPlatform {
        platform: platform_name.to_string(),
        key: key.to_string(),
    })
}

/// Immutable builtin variable set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuiltinVariables {
    vars: IndexMap<String, String>,
}

impl BuiltinVariables {
    /// Builtins for the host platform
    pub fn detect(root: &Path) -> Result<Self, ToolsError> {
        Self::for_platform(root, Platform::current()?)
    }

    pub fn for_platform(root: &Path, platform: Platform) -> Result<Self, ToolsError> {
        Self::for_platform_name(root, platform.name())
    }

    /// Builtins for a platform given by name; unknown names fail here
    pub fn for_platform_name(root: &Path, platform_name: &str) -> Result<Self, ToolsError> {
        let entries = [
            (BUILTIN_ROOT, root.display().to_string()),
            (
                BUILTIN_CLANG_FORMAT_TOOL_PATH,
                platform_value(platform_name, "clang_format")?.to_string(),
            ),
            (
                BUILTIN_CMAKE_TOOL_PATH,
                platform_value(platform_name, "cmake")?.to_string(),
            ),
            (
                BUILTIN_CMAKE_HOST_GENERATOR,
                platform_value(platform_name, "generator")?.to_string(),
            ),
            (
                BUILTIN_CMAKE_HOST_ARCHITECTURE,
                platform_value(platform_name, "arch")?.to_string(),
            ),
        ];

        Ok(Self::from_pairs(entries))
    }

    /// Arbitrary builtin set
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Lookup that treats a missing key as an error
    pub fn require(&self, key: &str) -> Result<&str, ToolsError> {
        self.get(key).ok_or_else(|| ToolsError::KeyNotFound {
            path: key.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_linux_builtins() {
        let vars = BuiltinVariables::for_platform(&PathBuf::from("/proj"), Platform::Linux).unwrap();
        assert_eq!(vars.get(BUILTIN_ROOT), Some("/proj"));
        assert_eq!(vars.get(BUILTIN_CLANG_FORMAT_TOOL_PATH), Some("clang-format"));
        assert_eq!(vars.get(BUILTIN_CMAKE_TOOL_PATH), Some("cmake"));
        assert_eq!(vars.get(BUILTIN_CMAKE_HOST_GENERATOR), Some("Unix Makefiles"));
        assert_eq!(vars.get(BUILTIN_CMAKE_HOST_ARCHITECTURE), Some(""));
        assert_eq!(vars.iter().count(), 5);
    }

    #[test]
    fn test_windows_and_macos_builtins() {
        let root = PathBuf::from("/proj");
        let win = BuiltinVariables::for_platform(&root, Platform::Windows).unwrap();
        assert_eq!(win.get(BUILTIN_CMAKE_TOOL_PATH), Some("cmake.exe"));
        assert_eq!(win.get(BUILTIN_CMAKE_HOST_GENERATOR), Some("Visual Studio 17"));

        let mac = BuiltinVariables::for_platform(&root, Platform::Macos).unwrap();
        assert_eq!(mac.get(BUILTIN_CMAKE_HOST_GENERATOR), Some("Xcode"));
    }

    #[test]
    fn test_unknown_platform_is_error() {
        let err = BuiltinVariables::for_platform_name(&PathBuf::from("/proj"), "haiku").unwrap_err();
        match err {
            ToolsError::UnknownPlatform { platform, key } => {
                assert_eq!(platform, "haiku");
                assert_eq!(key, "clang_format");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!("freebsd".parse::<Platform>().is_err());
    }

    #[cfg(any(target_os = "linux", target_os = "macos", target_os = "windows"))]
    #[test]
    fn test_detect_uses_host_platform() {
        let root = PathBuf::from("/proj");
        let host = Platform::current().unwrap();
        assert_eq!(host.name(), std::env::consts::OS);
        assert_eq!(
            BuiltinVariables::detect(&root).unwrap(),
            BuiltinVariables::for_platform(&root, host).unwrap()
        );
    }

    #[test]
    fn test_unknown_key_is_error() {
        assert!(platform_value("linux", "ninja").is_err());
    }

    #[test]
    fn test_require_missing_key() {
        let vars = BuiltinVariables::from_pairs([("root", "/proj")]);
        assert_eq!(vars.require("root").unwrap(), "/proj");
        assert!(vars.require("builtin_root").is_err());
    }
}
