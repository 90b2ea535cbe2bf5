//! Tool discovery and version gating
//!
//! Every executable named `tool` on PATH is a candidate. Candidates are probed
//! in the order the OS reports them and the first one that is new enough wins,
//! even when a later one is newer.

use std::fmt;
use std::path::PathBuf;

use crate::error::ToolsError;
use crate::exec::subprocess::CommandRunner;
use crate::version::{probe_version, VersionTriple};

/// An executable found on PATH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCandidate {
    /// Path to the tool executable
    pub path: PathBuf,
    /// Probed version (`None` until probed, or when the probe failed)
    pub version: Option<VersionTriple>,
}

impl ToolCandidate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            version: None,
        }
    }

    /// Probe the version once and cache the result
    pub fn probe(&mut self, runner: &dyn CommandRunner) -> Option<VersionTriple> {
        if self.version.is_none() {
            self.version = probe_version(runner, &self.path.to_string_lossy());
        }
        self.version
    }
}

impl fmt::Display for ToolCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "{} ({})", self.path.display(), v),
            None => write!(f, "{} (unknown version)", self.path.display()),
        }
    }
}

/// Finds executables on PATH through the OS search primitive
pub struct ToolLocator<'a> {
    runner: &'a dyn CommandRunner,
    windows: bool,
}

impl<'a> ToolLocator<'a> {
    /// Locator for the platform this binary runs on
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self::for_platform(runner, cfg!(windows))
    }

    /// Locator using `where` (Windows family) or `which -a` (everything else)
    pub fn for_platform(runner: &'a dyn CommandRunner, windows: bool) -> Self {
        Self { runner, windows }
    }

    fn search_command(&self, tool_name: &str) -> (&'static str, Vec<String>) {
        if self.windows {
            ("where", vec![tool_name.to_string()])
        } else {
            ("which", vec!["-a".to_string(), tool_name.to_string()])
        }
    }

    /// All executables named `tool_name` on PATH, in OS order
    ///
    /// A failed or empty search yields an empty list rather than an error.
    pub fn list_candidates(&self, tool_name: &str) -> Vec<PathBuf> {
        let (program, args) = self.search_command(tool_name);
        let result = match self.runner.output(program, &args) {
            Ok(result) if result.success => result,
            Ok(result) => {
                tracing::debug!(tool = tool_name, exit_code = result.exit_code, "PATH search found nothing");
                return Vec::new();
            }
            Err(e) => {
                tracing::debug!(tool = tool_name, error = %e, "PATH search failed");
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = Vec::new();
        for line in result.stdout.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let path = PathBuf::from(line);
            // `which -a` repeats a path when PATH lists a directory twice
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    /// First PATH-ordered candidate whose version is at least `min_version`
    pub fn select_tool(&self, tool_name: &str, min_version: VersionTriple) -> Result<ToolCandidate, ToolsError> {
        let candidates = self.list_candidates(tool_name);
        if candidates.is_empty() {
            return Err(ToolsError::ToolNotFound {
                tool: tool_name.to_string(),
            });
        }

        let checked = candidates.len();
        for path in candidates {
            let mut candidate = ToolCandidate::new(path);
            match candidate.probe(self.runner) {
                Some(version) if version >= min_version => {
                    tracing::debug!(tool = tool_name, %candidate, "selected");
                    return Ok(candidate);
                }
                _ => tracing::debug!(tool = tool_name, %candidate, minimum = %min_version, "rejected"),
            }
        }

        Err(ToolsError::NoVersionSatisfies {
            tool: tool_name.to_string(),
            minimum: min_version,
            checked,
        })
    }
}
