//! Show-config command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use super::{GlobalOptions, Project};
use crate::config::ConfigNode;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Toml,
    Json,
}

/// Show the resolved configuration file
#[derive(Args, Debug)]
pub struct ShowConfigCommand {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Toml)]
    pub format: OutputFormat,

    /// Print env.toml as written, without substituting variables
    #[arg(long)]
    pub raw: bool,

    /// Also list the builtin variables
    #[arg(long)]
    pub builtins: bool,

    /// Print only the value at this dotted path (e.g. command.cmake_gen)
    #[arg(long)]
    pub key: Option<String>,

    /// Value printed when --key is absent, instead of failing
    #[arg(long, requires = "key")]
    pub default: Option<String>,

    /// Override a value before printing or saving (KEY=VALUE, repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Write the (resolved) document to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ShowConfigCommand {
    /// Execute the show-config command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let mut project = if self.raw {
            Project::load_raw(opts)?
        } else {
            Project::load(opts)?
        };

        for (key, value) in &self.set {
            project
                .config
                .set(key, value.as_str())
                .with_context(|| format!("Failed to set {}", key))?;
        }

        if let Some(output) = &self.output {
            project
                .config
                .save(output)
                .with_context(|| format!("Failed to save configuration to {}", output.display()))?;
            opts.printer
                .success(&format!("Wrote {}", opts.printer.accent(&output.display().to_string())));
            return Ok(());
        }

        if let Some(key) = &self.key {
            let node = match &self.default {
                Some(default) => project.config.get_or(key, &ConfigNode::from(default.as_str())).clone(),
                None => project.config.get(key)?.clone(),
            };
            let rendered = match self.format {
                OutputFormat::Toml => render_value(&node)?,
                OutputFormat::Json => serde_json::to_string_pretty(&node.to_json())?,
            };
            println!("{}", rendered.trim_end());
            return Ok(());
        }

        if self.builtins {
            for (key, value) in project.builtins.iter() {
                println!("# {} = {:?}", key, value);
            }
            println!();
        }

        let rendered = match self.format {
            OutputFormat::Toml => project.config.to_toml_string()?,
            OutputFormat::Json => project.config.to_json_string()?,
        };
        println!("{}", rendered.trim_end());
        Ok(())
    }
}

/// Plain text for one value: strings bare, string lists one per line
fn render_value(node: &ConfigNode) -> Result<String> {
    if let Some(text) = node.as_str() {
        return Ok(text.to_string());
    }
    if let Some(items) = node.as_sequence() {
        if let Some(lines) = items.iter().map(ConfigNode::as_str).collect::<Option<Vec<_>>>() {
            return Ok(lines.join("\n"));
        }
    }
    if node.is_mapping() {
        return Ok(toml::to_string_pretty(&node.to_toml())?);
    }
    Ok(node.to_toml().to_string())
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got `{}`", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            parse_assignment("path.build=/tmp/b=c").unwrap(),
            ("path.build".to_string(), "/tmp/b=c".to_string())
        );
        assert!(parse_assignment("path.build").is_err());
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn test_render_value() {
        let cfg = Config::parse(
            "[command.autoformat]\nexts = [\".h\", \".cpp\"]\njobs = 4\nstyle = \"file\"\n",
            "env.toml",
        )
        .unwrap();
        assert_eq!(render_value(cfg.get("command.autoformat.exts").unwrap()).unwrap(), ".h\n.cpp");
        assert_eq!(render_value(cfg.get("command.autoformat.jobs").unwrap()).unwrap(), "4");
        assert_eq!(render_value(cfg.get("command.autoformat.style").unwrap()).unwrap(), "file");
        let table = render_value(cfg.get("command.autoformat").unwrap()).unwrap();
        assert!(table.contains("jobs = 4"), "{table}");
    }
}
