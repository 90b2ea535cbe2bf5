//! env.toml document model
//!
//! The document is kept as an ordered tree of [`ConfigNode`]s rather than a
//! fixed struct, so the resolver can rewrite any string leaf and `save` can
//! write the file back with its keys in their original order.
//!
//! Two lookup styles are offered and they fail differently:
//! - [`Config::get`] takes a dotted path and fails with `KeyNotFound`
//! - [`Config::field`] / [`FieldView::field`] walk one name at a time and
//!   fail with `AttributeNotFound`

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::error::ToolsError;

/// One value in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    String(String),
    Sequence(Vec<ConfigNode>),
    Mapping(IndexMap<String, ConfigNode>),
    // Non-string TOML scalars are carried through untouched
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(toml::value::Datetime),
}

/// One step of a location inside the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl ConfigNode {
    /// String content of a string leaf
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ConfigNode>> {
        match self {
            ConfigNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigNode]> {
        match self {
            ConfigNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, ConfigNode::Mapping(_))
    }

    /// Node at a step path (keys into mappings, indices into sequences)
    pub fn node_at(&self, steps: &[PathStep]) -> Option<&ConfigNode> {
        let mut current = self;
        for step in steps {
            current = match (current, step) {
                (ConfigNode::Mapping(map), PathStep::Key(key)) => map.get(key)?,
                (ConfigNode::Sequence(items), PathStep::Index(i)) => items.get(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn node_at_mut(&mut self, steps: &[PathStep]) -> Option<&mut ConfigNode> {
        let mut current = self;
        for step in steps {
            current = match (current, step) {
                (ConfigNode::Mapping(map), PathStep::Key(key)) => map.get_mut(key)?,
                (ConfigNode::Sequence(items), PathStep::Index(i)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Locations of every string leaf, in tree order
    ///
    /// Mappings are visited in insertion order and sequences by index, at any
    /// depth (mappings inside sequences included).
    pub fn string_leaf_paths(&self) -> Vec<Vec<PathStep>> {
        let mut out = Vec::new();
        let mut prefix = Vec::new();
        collect_string_leaves(self, &mut prefix, &mut out);
        out
    }

    /// Convert to a TOML value, preserving mapping order
    pub fn to_toml(&self) -> toml::Value {
        match self {
            ConfigNode::String(s) => toml::Value::String(s.clone()),
            ConfigNode::Integer(i) => toml::Value::Integer(*i),
            ConfigNode::Float(f) => toml::Value::Float(*f),
            ConfigNode::Boolean(b) => toml::Value::Boolean(*b),
            ConfigNode::Datetime(dt) => toml::Value::Datetime(*dt),
            ConfigNode::Sequence(items) => {
                toml::Value::Array(items.iter().map(ConfigNode::to_toml).collect())
            }
            ConfigNode::Mapping(map) => {
                let mut table = toml::Table::new();
                for (key, value) in map {
                    table.insert(key.clone(), value.to_toml());
                }
                toml::Value::Table(table)
            }
        }
    }

    /// Convert to a JSON value, preserving mapping order
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            ConfigNode::String(s) => Value::String(s.clone()),
            ConfigNode::Integer(i) => Value::from(*i),
            ConfigNode::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ConfigNode::Boolean(b) => Value::Bool(*b),
            ConfigNode::Datetime(dt) => Value::String(dt.to_string()),
            ConfigNode::Sequence(items) => Value::Array(items.iter().map(ConfigNode::to_json).collect()),
            ConfigNode::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn collect_string_leaves(node: &ConfigNode, prefix: &mut Vec<PathStep>, out: &mut Vec<Vec<PathStep>>) {
    match node {
        ConfigNode::String(_) => out.push(prefix.clone()),
        ConfigNode::Mapping(map) => {
            for (key, child) in map {
                prefix.push(PathStep::Key(key.clone()));
                collect_string_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        ConfigNode::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                prefix.push(PathStep::Index(i));
                collect_string_leaves(child, prefix, out);
                prefix.pop();
            }
        }
        _ => {}
    }
}

impl From<toml::Value> for ConfigNode {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ConfigNode::String(s),
            toml::Value::Integer(i) => ConfigNode::Integer(i),
            toml::Value::Float(f) => ConfigNode::Float(f),
            toml::Value::Boolean(b) => ConfigNode::Boolean(b),
            toml::Value::Datetime(dt) => ConfigNode::Datetime(dt),
            toml::Value::Array(items) => {
                ConfigNode::Sequence(items.into_iter().map(ConfigNode::from).collect())
            }
            toml::Value::Table(table) => ConfigNode::Mapping(
                table
                    .into_iter()
                    .map(|(key, value)| (key, ConfigNode::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigNode {
    fn from(value: &str) -> Self {
        ConfigNode::String(value.to_string())
    }
}

impl From<String> for ConfigNode {
    fn from(value: String) -> Self {
        ConfigNode::String(value)
    }
}

/// A loaded env.toml
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    root: ConfigNode,
    path: PathBuf,
}

impl Config {
    /// Load and parse a document from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ToolsError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ToolsError::io(format!("Failed to read {}", path.display()), e))?;
        Self::parse(&content, path)
    }

    /// Parse a document; `path` is remembered for `save` and error messages
    pub fn parse(content: &str, path: impl Into<PathBuf>) -> Result<Self, ToolsError> {
        let path = path.into();
        let table: toml::Table = content.parse().map_err(|e: toml::de::Error| ToolsError::ConfigParse {
            path: path.clone(),
            message: e.message().to_string(),
        })?;

        Ok(Self {
            root: ConfigNode::from(toml::Value::Table(table)),
            path,
        })
    }

    /// Path the document was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root mapping
    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    /// Root mapping, for in-place rewriting by the resolver
    pub(crate) fn root_mut(&mut self) -> &mut ConfigNode {
        &mut self.root
    }

    /// Non-failing dotted-path lookup
    ///
    /// Only mapping levels are walked; a segment that names into a sequence
    /// or a scalar is a miss.
    pub fn find(&self, dotted_path: &str) -> Option<&ConfigNode> {
        let mut current = &self.root;
        for part in dotted_path.split('.') {
            current = current.as_mapping()?.get(part)?;
        }
        Some(current)
    }

    /// Dotted-path lookup
    pub fn get(&self, dotted_path: &str) -> Result<&ConfigNode, ToolsError> {
        self.find(dotted_path).ok_or_else(|| ToolsError::KeyNotFound {
            path: dotted_path.to_string(),
        })
    }

    /// Dotted-path lookup falling back to `default`
    pub fn get_or<'a>(&'a self, dotted_path: &str, default: &'a ConfigNode) -> &'a ConfigNode {
        self.find(dotted_path).unwrap_or(default)
    }

    /// Replace the value at a dotted path
    ///
    /// Every intermediate mapping must already exist; only the last segment
    /// may be new.
    pub fn set(&mut self, dotted_path: &str, value: impl Into<ConfigNode>) -> Result<(), ToolsError> {
        let missing = || ToolsError::KeyNotFound {
            path: dotted_path.to_string(),
        };

        let (parent_path, last) = match dotted_path.rsplit_once('.') {
            Some((parent, last)) => (Some(parent), last),
            None => (None, dotted_path),
        };

        let mut parent = &mut self.root;
        if let Some(parent_path) = parent_path {
            for part in parent_path.split('.') {
                parent = match parent {
                    ConfigNode::Mapping(map) => map.get_mut(part).ok_or_else(missing)?,
                    _ => return Err(missing()),
                };
            }
        }

        match parent {
            ConfigNode::Mapping(map) => {
                map.insert(last.to_string(), value.into());
                Ok(())
            }
            _ => Err(missing()),
        }
    }

    /// Field-style access on the root mapping
    pub fn field(&self, name: &str) -> Result<FieldView<'_>, ToolsError> {
        FieldView {
            node: &self.root,
            path: String::new(),
        }
        .field(name)
    }

    /// Deserialize the mapping at `dotted_path` into a typed section
    ///
    /// The table is reached by field-style access, so a missing table is an
    /// `AttributeNotFound` naming the full path.
    pub fn section<T: DeserializeOwned>(&self, dotted_path: &str) -> Result<T, ToolsError> {
        let mut parts = dotted_path.split('.');
        let mut view = self.field(parts.next().unwrap_or_default())?;
        for part in parts {
            view = view.field(part)?;
        }

        if !view.node().is_mapping() {
            return Err(ToolsError::ConfigParse {
                path: self.path.clone(),
                message: format!("`{}` is not a table", view.path()),
            });
        }
        view.node().to_toml().try_into().map_err(|e: toml::de::Error| ToolsError::ConfigParse {
            path: self.path.clone(),
            message: format!("[{}]: {}", view.path(), e.message()),
        })
    }

    /// Serialize the current tree as TOML
    pub fn to_toml_string(&self) -> Result<String, ToolsError> {
        toml::to_string_pretty(&self.root.to_toml()).map_err(|e| ToolsError::ConfigParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Serialize the current tree as pretty JSON
    pub fn to_json_string(&self) -> Result<String, ToolsError> {
        serde_json::to_string_pretty(&self.root.to_json()).map_err(|e| ToolsError::ConfigParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Write the current tree to `path`
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ToolsError> {
        let path = path.as_ref();
        let content = self.to_toml_string()?;
        fs::write(path, content).map_err(|e| ToolsError::io(format!("Failed to write {}", path.display()), e))
    }
}

/// Borrowed view of one node reached by field-style access
#[derive(Debug, Clone)]
pub struct FieldView<'a> {
    node: &'a ConfigNode,
    path: String,
}

impl<'a> FieldView<'a> {
    /// Child field; fails with `AttributeNotFound` naming the full path
    pub fn field(&self, name: &str) -> Result<FieldView<'a>, ToolsError> {
        let path = if self.path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.path, name)
        };

        match self.node.as_mapping().and_then(|map| map.get(name)) {
            Some(node) => Ok(FieldView { node, path }),
            None => Err(ToolsError::AttributeNotFound { name: path }),
        }
    }

    pub fn node(&self) -> &'a ConfigNode {
        self.node
    }

    /// Dotted path this view was reached by
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DOC: &str = r#"
[project]
name = "tavros"
jobs = 8

[path]
root = "/proj"
build = "${path.root}/build"

[command.autoformat]
exts = [".hpp", ".cpp"]
enabled = true

[command.cmake_gen]
min_version = "3.28"

[[command.cmake_gen.presets]]
name = "debug"
dir = "${path.build}/debug"
"#;

    fn doc() -> Config {
        Config::parse(DOC, "env.toml").unwrap()
    }

    #[test]
    fn test_get_walks_mappings() {
        let cfg = doc();
        assert_eq!(cfg.get("project.name").unwrap().as_str(), Some("tavros"));
        assert_eq!(cfg.get("project.jobs").unwrap(), &ConfigNode::Integer(8));
        assert!(cfg.get("command.cmake_gen").unwrap().is_mapping());
        assert_eq!(cfg.get("command.cmake_gen.min_version").unwrap().as_str().unwrap(), "3.28");
    }

    #[test]
    fn test_get_missing_is_key_not_found() {
        let cfg = doc();
        let err = cfg.get("command.autoformat.include").unwrap_err();
        assert!(matches!(err, ToolsError::KeyNotFound { ref path } if path == "command.autoformat.include"));

        // Scalars and sequences cannot be indexed by name
        assert!(cfg.get("project.name.first").is_err());
        assert!(cfg.get("command.autoformat.exts.0").is_err());
        assert!(cfg.get("command.cmake_gen.presets.name").is_err());
    }

    #[test]
    fn test_get_or_default() {
        let cfg = doc();
        let fallback = ConfigNode::Sequence(Vec::new());
        assert_eq!(cfg.get_or("command.autoformat.exclude", &fallback), &fallback);
        assert_eq!(cfg.get_or("project.name", &fallback).as_str(), Some("tavros"));
    }

    #[test]
    fn test_field_access_error_is_distinct() {
        let cfg = doc();
        let cmake = cfg.field("command").unwrap().field("cmake_gen").unwrap();
        assert_eq!(cmake.path(), "command.cmake_gen");
        assert!(cmake.node().is_mapping());

        let err = cfg.field("command").unwrap().field("cmake_genn").unwrap_err();
        match err {
            ToolsError::AttributeNotFound { name } => assert_eq!(name, "command.cmake_genn"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_existing_and_new_leaf() {
        let mut cfg = doc();
        cfg.set("path.build", "/proj/out").unwrap();
        assert_eq!(cfg.get("path.build").unwrap().as_str().unwrap(), "/proj/out");

        cfg.set("path.cache", "/proj/cache").unwrap();
        assert_eq!(cfg.get("path.cache").unwrap().as_str().unwrap(), "/proj/cache");
    }

    #[test]
    fn test_set_does_not_create_intermediate_levels() {
        let mut cfg = doc();
        let err = cfg.set("missing.level.key", "x").unwrap_err();
        assert!(matches!(err, ToolsError::KeyNotFound { .. }));
        assert!(cfg.find("missing").is_none());

        assert!(cfg.set("project.name.inner", "x").is_err());
    }

    #[test]
    fn test_string_leaf_paths_in_tree_order() {
        let cfg = doc();
        let paths = cfg.root().string_leaf_paths();
        let key = |k: &str| PathStep::Key(k.to_string());

        assert_eq!(paths[0], vec![key("project"), key("name")]);
        assert_eq!(paths[1], vec![key("path"), key("root")]);
        assert_eq!(
            paths[3],
            vec![key("command"), key("autoformat"), key("exts"), PathStep::Index(0)]
        );
        assert_eq!(
            paths.last().unwrap(),
            &vec![
                key("command"),
                key("cmake_gen"),
                key("presets"),
                PathStep::Index(0),
                key("dir")
            ]
        );
        // Integers and booleans are not string leaves
        assert_eq!(paths.len(), 8);
    }

    #[test]
    fn test_save_load_round_trip_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("env.toml");
        fs::write(&path, DOC).unwrap();

        let cfg = Config::load(&path).unwrap();
        let out = temp.path().join("saved.toml");
        cfg.save(&out).unwrap();
        let reloaded = Config::load(&out).unwrap();

        assert_eq!(reloaded.root(), cfg.root());
        let keys: Vec<_> = reloaded.root().as_mapping().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["project", "path", "command"]);
        let inner: Vec<_> = reloaded
            .get("project")
            .unwrap()
            .as_mapping()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(inner, vec!["name", "jobs"]);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse("[project\nname = ", "bad.toml").unwrap_err();
        assert!(matches!(err, ToolsError::ConfigParse { .. }));
    }

    #[test]
    fn test_json_rendering_keeps_order() {
        let cfg = doc();
        let json = cfg.to_json_string().unwrap();
        let project = json.find("\"project\"").unwrap();
        let command = json.find("\"command\"").unwrap();
        assert!(project < command);
        assert!(json.contains("\"jobs\": 8"));
    }
}
