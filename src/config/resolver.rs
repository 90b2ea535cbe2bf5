//! `${...}` substitution over a loaded env.toml
//!
//! Every string leaf of the document is scanned for `${identifier}` tokens
//! (identifier: letters, digits, `_` and `.`). A token is replaced by the
//! builtin variable of that name, or else by the string found at that dotted
//! path in the document itself. Builtins win over a document path with the
//! same name.
//!
//! Because a replacement may itself contain tokens, resolution runs in
//! passes. A pass visits every string leaf in tree order and sees the values
//! already rewritten earlier in the same pass. Passes stop after one that
//! changes nothing, or after `max_passes`. Tokens that are still there at
//! that point (unknown names, cycles, chains deeper than the pass limit) stay
//! as literal text unless strict mode is selected.

use regex::Regex;

use super::builtin::BuiltinVariables;
use super::document::{Config, ConfigNode, PathStep};
use crate::error::ToolsError;

pub const DEFAULT_MAX_PASSES: usize = 10;

const TOKEN_PATTERN: &str = r"\$\{([a-zA-Z0-9_.]+)\}";

/// What to do with tokens left after the last pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolveMode {
    /// Leave them as literal `${...}` text
    #[default]
    Lenient,
    /// Fail with `UnresolvedVariable`
    Strict,
}

/// Outcome of a resolver run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Passes executed, including the final pass that changed nothing
    pub passes: usize,
    /// Tokens replaced, summed over all passes
    pub substitutions: usize,
    /// Identifiers still present as literal tokens, in first-seen order
    pub unresolved: Vec<String>,
}

impl ResolveReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Multi-pass variable resolver
#[derive(Debug, Clone)]
pub struct VariableResolver {
    pattern: Regex,
    max_passes: usize,
    mode: ResolveMode,
}

impl Default for VariableResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableResolver {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"),
            max_passes: DEFAULT_MAX_PASSES,
            mode: ResolveMode::Lenient,
        }
    }

    /// Set the pass limit (at least one pass always runs)
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn mode(mut self, mode: ResolveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Substitute the tokens of one string against the current document
    ///
    /// Returns the new text and how many tokens were replaced by something
    /// other than themselves.
    pub fn resolve(&self, text: &str, vars: &BuiltinVariables, cfg: &Config) -> (String, usize) {
        let mut out = String::with_capacity(text.len());
        let mut replaced = 0;
        let mut last = 0;

        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let name = &caps[1];
            out.push_str(&text[last..whole.start()]);

            match lookup(name, vars, cfg) {
                Some(value) if value != whole.as_str() => {
                    out.push_str(value);
                    replaced += 1;
                }
                _ => out.push_str(whole.as_str()),
            }
            last = whole.end();
        }

        out.push_str(&text[last..]);
        (out, replaced)
    }

    /// Rewrite every string leaf of `cfg` in place
    pub fn resolve_for_config(&self, cfg: &mut Config, vars: &BuiltinVariables) -> Result<ResolveReport, ToolsError> {
        // Substitution never changes the shape of the tree
        let leaves = cfg.root().string_leaf_paths();
        let mut report = ResolveReport::default();

        while report.passes < self.max_passes {
            report.passes += 1;
            let mut pass_substitutions = 0;

            for steps in &leaves {
                let Some(text) = cfg.root().node_at(steps).and_then(ConfigNode::as_str) else {
                    continue;
                };
                if !text.contains("${") {
                    continue;
                }

                let (resolved, count) = self.resolve(text, vars, cfg);
                if count == 0 {
                    continue;
                }
                if let Some(node) = cfg.root_mut().node_at_mut(steps) {
                    *node = ConfigNode::String(resolved);
                }
                pass_substitutions += count;
            }

            tracing::debug!(pass = report.passes, substitutions = pass_substitutions, "resolver pass");
            report.substitutions += pass_substitutions;
            if pass_substitutions == 0 {
                break;
            }
        }

        report.unresolved = self.unresolved_tokens(cfg, &leaves);
        if !report.unresolved.is_empty() {
            tracing::debug!(unresolved = ?report.unresolved, passes = report.passes, "tokens left unresolved");
            if self.mode == ResolveMode::Strict {
                return Err(ToolsError::UnresolvedVariable {
                    name: report.unresolved[0].clone(),
                });
            }
        }

        Ok(report)
    }

    fn unresolved_tokens(&self, cfg: &Config, leaves: &[Vec<PathStep>]) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for steps in leaves {
            let Some(text) = cfg.root().node_at(steps).and_then(ConfigNode::as_str) else {
                continue;
            };
            for caps in self.pattern.captures_iter(text) {
                let name = &caps[1];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }
}

/// Builtin first, then a string leaf of the document
fn lookup<'a>(name: &str, vars: &'a BuiltinVariables, cfg: &'a Config) -> Option<&'a str> {
    vars.get(name).or_else(|| cfg.find(name).and_then(ConfigNode::as_str))
}
