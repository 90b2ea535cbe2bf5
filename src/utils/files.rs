//! Recursive source file collection

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File filter shared by autoformat and collect-sources
#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    /// File name suffixes, e.g. ".cpp" or ".test.cpp"
    pub exts: Vec<String>,
    /// Path prefixes that are skipped
    pub exclude: Vec<PathBuf>,
}

impl FileFilter {
    pub fn new(exts: &[String], exclude: &[String]) -> Self {
        Self {
            exts: exts.to_vec(),
            exclude: exclude.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn has_suffix(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exts.iter().any(|ext| text.ends_with(ext.as_str()))
    }

    pub fn is_excluded(&self, path: &Path) -> bool {
        let text = path.to_string_lossy();
        self.exclude
            .iter()
            .any(|excluded| text.starts_with(excluded.to_string_lossy().as_ref()))
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.has_suffix(path) && !self.is_excluded(path)
    }

    /// Files under every include entry, sorted by (parent directory, path)
    ///
    /// An include entry may be a single file or a directory searched
    /// recursively. Entries that do not exist are skipped.
    pub fn collect<P: AsRef<Path>>(&self, include: &[P]) -> Vec<PathBuf> {
        let mut files = Vec::new();

        for entry in include {
            let entry = entry.as_ref();
            if entry.is_file() {
                if self.accepts(entry) {
                    files.push(entry.to_path_buf());
                }
                continue;
            }
            if !entry.is_dir() {
                tracing::warn!(path = %entry.display(), "include path does not exist");
                continue;
            }

            for item in WalkDir::new(entry)
                .follow_links(false)
                .into_iter()
                .filter_entry(|e| !(e.file_type().is_dir() && self.is_excluded(e.path())))
                .filter_map(|e| e.ok())
            {
                if item.file_type().is_file() && self.accepts(item.path()) {
                    files.push(item.into_path());
                }
            }
        }

        files.sort_by(|a, b| (a.parent(), a.as_path()).cmp(&(b.parent(), b.as_path())));
        files.dedup();
        files
    }
}
