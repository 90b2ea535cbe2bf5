//! Collect-sources command implementation
//!
//! Regenerates `CMakeSources.txt` in every library directory listed under
//! `[command.collect_sources]`. Each manifest defines CMake list variables:
//! - `TAV_<LIB>_CROSSPLATFORM_SOURCES`
//! - `TAV_<LIB>_<PLATFORM>_SOURCES` for each platform subfolder
//! - `TAV_<LIB>_TEST_SOURCES`

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use super::{GlobalOptions, Project};
use crate::config::sections::{CollectSourcesSection, COLLECT_SOURCES_SECTION};
use crate::utils::files::FileFilter;
use crate::utils::paths::to_posix_relative;
use crate::utils::terminal::Printer;

pub const MANIFEST_FILE_NAME: &str = "CMakeSources.txt";

/// Collect source code files into `CMakeSources.txt`
#[derive(Args, Debug)]
pub struct CollectSourcesCommand {}

impl CollectSourcesCommand {
    /// Execute the collect-sources command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let project = Project::load(opts)?;
        collect_sources(&project, &opts.printer).map(|_| ())
    }
}

/// Sources of one library, split into manifest groups
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LibrarySources {
    pub crossplatform: Vec<PathBuf>,
    /// In `platform_subfolders` order; groups may be empty
    pub platforms: Vec<(String, Vec<PathBuf>)>,
    pub tests: Vec<PathBuf>,
}

impl LibrarySources {
    /// Split the files under `lib_dir` per the section's filters
    pub fn scan(lib_dir: &Path, section: &CollectSourcesSection) -> Self {
        let all = FileFilter::new(&section.exts, &section.exclude).collect(&[lib_dir]);
        let tests = FileFilter::new(&section.test_exts, &section.exclude).collect(&[lib_dir]);

        let platforms: Vec<(String, Vec<PathBuf>)> = section
            .platform_subfolders
            .iter()
            .map(|(name, subfolder)| {
                let matching = all
                    .iter()
                    .filter(|s| to_posix_relative(s, lib_dir).contains(subfolder.as_str()))
                    .cloned()
                    .collect();
                (name.clone(), matching)
            })
            .collect();

        let crossplatform = all
            .iter()
            .filter(|s| !tests.contains(s))
            .filter(|s| !platforms.iter().any(|(_, group)| group.contains(s)))
            .cloned()
            .collect();

        Self {
            crossplatform,
            platforms,
            tests,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.crossplatform.is_empty()
            && self.tests.is_empty()
            && self.platforms.iter().all(|(_, group)| group.is_empty())
    }

    /// Manifest text, or `None` when the library has no sources at all
    pub fn render(&self, lib_dir: &Path, lib_name: &str) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let prefix = format!("TAV_{}", lib_name.to_uppercase());
        let mut out = String::new();
        out.push_str("#\n# Autogenerated file, do not edit manually\n");
        out.push_str("# Use `tavros collect-sources` to regenerate this file\n#\n\n");

        if !self.crossplatform.is_empty() {
            write_list(&mut out, &format!("{}_CROSSPLATFORM_SOURCES", prefix), &self.crossplatform, lib_dir);
        }
        for (platform, group) in &self.platforms {
            if !group.is_empty() {
                let name = format!("{}_{}_SOURCES", prefix, platform.to_uppercase());
                write_list(&mut out, &name, group, lib_dir);
            }
        }
        if !self.tests.is_empty() {
            write_list(&mut out, &format!("{}_TEST_SOURCES", prefix), &self.tests, lib_dir);
        }

        Some(out)
    }
}

// A blank line separates runs of files from different directories
fn write_list(out: &mut String, variable: &str, sources: &[PathBuf], lib_dir: &Path) {
    let _ = writeln!(out, "set({}", variable);
    let mut prev: Option<&Path> = None;
    for source in sources {
        if let Some(prev) = prev {
            if prev.parent() != source.parent() {
                out.push('\n');
            }
        }
        let _ = writeln!(out, "    ${{CMAKE_CURRENT_LIST_DIR}}/{}", to_posix_relative(source, lib_dir));
        prev = Some(source);
    }
    out.push_str(")\n\n");
}

/// Write every manifest; returns the paths written
pub fn collect_sources(project: &Project, printer: &Printer) -> Result<Vec<PathBuf>> {
    printer.step("Collecting sources...");

    let section: CollectSourcesSection = project.config.section(COLLECT_SOURCES_SECTION)?;
    let mut written = Vec::new();

    for path in &section.collect_paths {
        let lib_dir = PathBuf::from(path);
        if !lib_dir.is_dir() {
            printer.warning(&format!("Directory does not exist: {}", printer.accent(path)));
            continue;
        }

        let lib_name = lib_dir
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let sources = LibrarySources::scan(&lib_dir, &section);
        let Some(manifest) = sources.render(&lib_dir, &lib_name) else {
            tracing::debug!(dir = %lib_dir.display(), "no sources, manifest skipped");
            continue;
        };

        let manifest_path = lib_dir.join(MANIFEST_FILE_NAME);
        fs::write(&manifest_path, manifest)
            .with_context(|| format!("Failed to write {}", manifest_path.display()))?;
        let shown = to_posix_relative(&manifest_path, &project.root);
        printer.info(&format!("Sources: {}", printer.accent(&shown)));
        written.push(manifest_path);
    }

    printer.step_done("Collecting sources...");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn section(lib: &Path) -> CollectSourcesSection {
        let mut platform_subfolders = IndexMap::new();
        platform_subfolders.insert("win32".to_string(), "platform/win32".to_string());
        platform_subfolders.insert("macos".to_string(), "platform/macos".to_string());
        CollectSourcesSection {
            collect_paths: vec![lib.display().to_string()],
            exts: vec![".hpp".to_string(), ".cpp".to_string()],
            test_exts: vec![".test.cpp".to_string()],
            exclude: vec![],
            platform_subfolders,
        }
    }

    fn library() -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("system");
        touch(&lib.join("tavros/system/window.hpp"));
        touch(&lib.join("tavros/system/window.cpp"));
        touch(&lib.join("tavros/system/platform/win32/window_win32.cpp"));
        touch(&lib.join("tavros/system/math/vec.cpp"));
        touch(&lib.join("tavros/system/window.test.cpp"));
        (temp, lib)
    }

    #[test]
    fn test_scan_splits_groups() {
        let (_temp, lib) = library();
        let sources = LibrarySources::scan(&lib, &section(&lib));

        assert_eq!(
            sources.crossplatform,
            vec![
                lib.join("tavros/system/window.cpp"),
                lib.join("tavros/system/window.hpp"),
                lib.join("tavros/system/math/vec.cpp"),
            ]
        );
        assert_eq!(sources.platforms[0].0, "win32");
        assert_eq!(
            sources.platforms[0].1,
            vec![lib.join("tavros/system/platform/win32/window_win32.cpp")]
        );
        assert!(sources.platforms[1].1.is_empty());
        assert_eq!(sources.tests, vec![lib.join("tavros/system/window.test.cpp")]);
    }

    #[test]
    fn test_render_manifest() {
        let (_temp, lib) = library();
        let manifest = LibrarySources::scan(&lib, &section(&lib))
            .render(&lib, "system")
            .unwrap();

        let expected = "\
#
# Autogenerated file, do not edit manually
# Use `tavros collect-sources` to regenerate this file
#

set(TAV_SYSTEM_CROSSPLATFORM_SOURCES
    ${CMAKE_CURRENT_LIST_DIR}/tavros/system/window.cpp
    ${CMAKE_CURRENT_LIST_DIR}/tavros/system/window.hpp

    ${CMAKE_CURRENT_LIST_DIR}/tavros/system/math/vec.cpp
)

set(TAV_SYSTEM_WIN32_SOURCES
    ${CMAKE_CURRENT_LIST_DIR}/tavros/system/platform/win32/window_win32.cpp
)

set(TAV_SYSTEM_TEST_SOURCES
    ${CMAKE_CURRENT_LIST_DIR}/tavros/system/window.test.cpp
)

";
        assert_eq!(manifest, expected);
    }

    #[test]
    fn test_empty_library_has_no_manifest() {
        let temp = TempDir::new().unwrap();
        let lib = temp.path().join("empty");
        touch(&lib.join("README.md"));
        let sources = LibrarySources::scan(&lib, &section(&lib));
        assert!(sources.is_empty());
        assert_eq!(sources.render(&lib, "empty"), None);
    }
}
