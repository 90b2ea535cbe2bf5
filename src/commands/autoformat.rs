//! Autoformat command implementation
//!
//! Runs clang-format in place over every matching source file. Files are
//! independent, so they are formatted on a worker pool sized to the CPU
//! count; a failing file does not stop the others and failures are reported
//! together once the pool has drained.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use rayon::prelude::*;

use super::{GlobalOptions, Project};
use crate::config::builtin::BUILTIN_CLANG_FORMAT_TOOL_PATH;
use crate::config::sections::{AutoformatSection, AUTOFORMAT_SECTION};
use crate::error::ToolsError;
use crate::exec::subprocess::{run_command, CommandRunner, SystemRunner};
use crate::utils::files::FileFilter;
use crate::utils::terminal::Printer;
use crate::utils::tools::{ToolCandidate, ToolLocator};

const FALLBACK_WORKERS: usize = 8;

/// Autoformat all source code files
#[derive(Args, Debug)]
pub struct AutoformatCommand {
    /// Number of parallel clang-format processes (default: CPU count)
    #[arg(short, long)]
    pub jobs: Option<usize>,
}

impl AutoformatCommand {
    /// Execute the autoformat command
    pub fn execute(self, opts: &GlobalOptions) -> Result<()> {
        let project = Project::load(opts)?;
        autoformat(&project, &opts.printer, &SystemRunner, self.jobs)
    }
}

/// Outcome of formatting one file
#[derive(Debug)]
pub struct FormatOutcome {
    pub path: PathBuf,
    pub result: Result<(), ToolsError>,
}

/// Select clang-format per `[command.autoformat]` and format every file
pub fn autoformat(
    project: &Project,
    printer: &Printer,
    runner: &dyn CommandRunner,
    jobs: Option<usize>,
) -> Result<()> {
    printer.step("Applying clang-format...");

    let section: AutoformatSection = project.config.section(AUTOFORMAT_SECTION)?;
    let tool_name = match &section.tool {
        Some(tool) => tool.clone(),
        None => project.builtins.require(BUILTIN_CLANG_FORMAT_TOOL_PATH)?.to_string(),
    };

    let tool = ToolLocator::new(runner).select_tool(&tool_name, section.min_version)?;
    announce_tool(printer, &tool_name, &tool);

    let style_param = format!("--style=file:{}", section.clang_format_style_file);
    let files = FileFilter::new(&section.exts, &section.exclude).collect(&section.include);
    if files.is_empty() {
        printer.warning("no files matched [command.autoformat]");
        printer.step_done("Applying clang-format...");
        return Ok(());
    }

    let workers = jobs.unwrap_or_else(default_workers).max(1);
    tracing::debug!(files = files.len(), workers, "formatting");
    let outcomes = format_files(&tool.path, &style_param, &files, workers, printer)?;

    let failures: Vec<&FormatOutcome> = outcomes.iter().filter(|o| o.result.is_err()).collect();
    for failure in &failures {
        if let Err(e) = &failure.result {
            printer.error(&format!("{}: {}", failure.path.display(), e));
        }
    }
    if !failures.is_empty() {
        return Err(ToolsError::FormatFailures {
            failed: failures.len(),
            total: outcomes.len(),
        }
        .into());
    }

    printer.step_done("Applying clang-format...");
    Ok(())
}

fn announce_tool(printer: &Printer, tool_name: &str, tool: &ToolCandidate) {
    let version = tool
        .version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    printer.info(&format!(
        "Using {} {} from {}",
        tool_name,
        version,
        printer.accent(&tool.path.display().to_string())
    ));
}

/// Worker count: available parallelism, or 8 when that is unknown
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_WORKERS)
}

/// Format `files` in place on a pool of `workers` threads
///
/// Every file is attempted; the returned outcomes are in input order.
pub fn format_files(
    tool: &Path,
    style_param: &str,
    files: &[PathBuf],
    workers: usize,
    printer: &Printer,
) -> Result<Vec<FormatOutcome>> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .context("Failed to start formatter worker pool")?;

    let program = tool.display().to_string();
    let pb = printer.progress_bar(files.len() as u64, "clang-format");

    let outcomes = pool.install(|| {
        files
            .par_iter()
            .map(|path| {
                let args = vec![style_param.to_string(), "-i".to_string(), path.display().to_string()];
                let result = run_command(&program, &args, false)
                    .and_then(|r| r.check())
                    .map(|_| ());
                pb.inc(1);
                FormatOutcome {
                    path: path.clone(),
                    result,
                }
            })
            .collect::<Vec<_>>()
    });

    pb.finish_and_clear();
    Ok(outcomes)
}
