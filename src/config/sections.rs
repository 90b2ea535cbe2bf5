//! Typed views of the `[command.*]` sections
//!
//! Read from the resolved document with [`Config::section`], so every string
//! here has already had its `${...}` references substituted.
//!
//! [`Config::section`]: super::document::Config::section

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::version::{parse_version, VersionTriple};

pub const AUTOFORMAT_SECTION: &str = "command.autoformat";
pub const COLLECT_SOURCES_SECTION: &str = "command.collect_sources";
pub const CMAKE_GEN_SECTION: &str = "command.cmake_gen";

/// `[command.autoformat]`
#[derive(Debug, Clone, Deserialize)]
pub struct AutoformatSection {
    /// Formatter executable name; defaults to the platform builtin
    pub tool: Option<String>,

    /// Oldest acceptable formatter version
    #[serde(deserialize_with = "version_from_any")]
    pub min_version: VersionTriple,

    /// Passed as `--style=file:<path>`
    pub clang_format_style_file: String,

    /// Files or directories to format (a single string is accepted)
    #[serde(deserialize_with = "one_or_many")]
    pub include: Vec<String>,

    /// Path prefixes to skip
    #[serde(default)]
    pub exclude: Vec<String>,

    /// File name suffixes to format, e.g. ".cpp"
    pub exts: Vec<String>,
}

/// `[command.collect_sources]`
#[derive(Debug, Clone, Deserialize)]
pub struct CollectSourcesSection {
    /// Library directories, one CMakeSources.txt each
    pub collect_paths: Vec<String>,
    pub exts: Vec<String>,
    pub test_exts: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Platform name → fragment of the relative path marking its sources
    #[serde(default)]
    pub platform_subfolders: IndexMap<String, String>,
}

/// `[command.cmake_gen]`
#[derive(Debug, Clone, Deserialize)]
pub struct CmakeGenSection {
    /// CMake executable name; defaults to the platform builtin
    pub tool: Option<String>,

    #[serde(deserialize_with = "version_from_any")]
    pub min_version: VersionTriple,

    /// Directory holding the top-level CMakeLists.txt
    pub source_dir: String,

    /// Base build directory; each generator gets a subdirectory
    pub build_dir: String,

    /// Passed as `-A`, only to Visual Studio generators
    #[serde(default)]
    pub architecture: Option<String>,

    /// Extra `-D<name>=<value>` cache entries
    #[serde(default)]
    pub definitions: IndexMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Major(u64),
    Float(f64),
}

// A bare float cannot tell `3.1` from `3.10`, so it must be quoted
fn version_from_any<'de, D: Deserializer<'de>>(deserializer: D) -> Result<VersionTriple, D::Error> {
    match RawVersion::deserialize(deserializer)? {
        RawVersion::Text(s) => Ok(parse_version(&s)),
        RawVersion::Major(major) => Ok(VersionTriple::new(major, 0, 0)),
        RawVersion::Float(f) => Err(D::Error::custom(format!(
            "unquoted version {} is ambiguous, write it as a string (e.g. \"3.10\")",
            f
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::document::Config;
    use crate::error::ToolsError;

    #[test]
    fn test_autoformat_section() {
        let cfg = Config::parse(
            r#"
[command.autoformat]
min_version = "17.0"
clang_format_style_file = "/p/.clang-format"
include = "/p/sources"
exts = [".hpp", ".cpp"]
"#,
            "env.toml",
        )
        .unwrap();

        let section: AutoformatSection = cfg.section(AUTOFORMAT_SECTION).unwrap();
        assert_eq!(section.tool, None);
        assert_eq!(section.min_version, VersionTriple::new(17, 0, 0));
        assert_eq!(section.include, vec!["/p/sources"]);
        assert!(section.exclude.is_empty());
        assert_eq!(section.exts, vec![".hpp", ".cpp"]);
    }

    #[test]
    fn test_quoted_and_integer_min_version() {
        let cfg = Config::parse(
            r#"
[command.cmake_gen]
min_version = "3.10"
source_dir = "/p"
build_dir = "/p/build"

[command.cmake_gen.definitions]
TAV_BUILD_TESTS = "ON"
CMAKE_EXPORT_COMPILE_COMMANDS = "ON"
"#,
            "env.toml",
        )
        .unwrap();

        let section: CmakeGenSection = cfg.section(CMAKE_GEN_SECTION).unwrap();
        assert_eq!(section.min_version, VersionTriple::new(3, 10, 0));
        let names: Vec<_> = section.definitions.keys().cloned().collect();
        assert_eq!(names, vec!["TAV_BUILD_TESTS", "CMAKE_EXPORT_COMPILE_COMMANDS"]);
    }

    #[test]
    fn test_unquoted_float_min_version_is_rejected() {
        let cfg = Config::parse(
            "[command.cmake_gen]\nmin_version = 3.10\nsource_dir = \"/p\"\nbuild_dir = \"/p/build\"\n",
            "env.toml",
        )
        .unwrap();

        match cfg.section::<CmakeGenSection>(CMAKE_GEN_SECTION).unwrap_err() {
            ToolsError::ConfigParse { message, .. } => assert!(message.contains("as a string"), "{message}"),
            other => panic!("unexpected error: {other}"),
        }

        let cfg = Config::parse(
            "[command.autoformat]\nmin_version = 17\nclang_format_style_file = \"s\"\ninclude = []\nexts = []\n",
            "env.toml",
        )
        .unwrap();
        let section: AutoformatSection = cfg.section(AUTOFORMAT_SECTION).unwrap();
        assert_eq!(section.min_version, VersionTriple::new(17, 0, 0));
    }

    #[test]
    fn test_collect_sources_keeps_platform_order() {
        let cfg = Config::parse(
            r#"
[command.collect_sources]
collect_paths = ["/p/libs/core"]
exts = [".cpp"]
test_exts = [".test.cpp"]

[command.collect_sources.platform_subfolders]
win32 = "platform/win32"
macos = "platform/macos"
"#,
            "env.toml",
        )
        .unwrap();

        let section: CollectSourcesSection = cfg.section(COLLECT_SOURCES_SECTION).unwrap();
        let names: Vec<_> = section.platform_subfolders.keys().cloned().collect();
        assert_eq!(names, vec!["win32", "macos"]);
    }

    #[test]
    fn test_missing_section_and_bad_section() {
        let cfg = Config::parse("[command.autoformat]\nexts = 3\n", "env.toml").unwrap();

        let missing = cfg.section::<CmakeGenSection>(CMAKE_GEN_SECTION).unwrap_err();
        assert!(matches!(missing, ToolsError::AttributeNotFound { ref name } if name == "command.cmake_gen"));

        let not_table = Config::parse("[command]\ncmake_gen = \"x\"\n", "env.toml").unwrap();
        let err = not_table.section::<CmakeGenSection>(CMAKE_GEN_SECTION).unwrap_err();
        assert!(matches!(err, ToolsError::ConfigParse { .. }));

        let bad = cfg.section::<AutoformatSection>(AUTOFORMAT_SECTION).unwrap_err();
        assert!(matches!(bad, ToolsError::ConfigParse { .. }));
    }
}
