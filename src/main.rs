//! tavros - project tooling for the Tavros engine
//!
//! Resolves the project's env.toml, then runs one of the commands:
//!
//! ```text
//! env.toml → config::resolver → commands → clang-format / CMake (via utils::tools)
//! ```

mod build;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod utils;
mod version;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use error::ToolsError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let opts = cli.global_options();
    init_tracing(opts.verbose);

    match cli.execute(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.chain().find_map(|cause| cause.downcast_ref::<ToolsError>()) {
                Some(tools_error) if e.chain().count() == 1 => {
                    tools_error.display_with_hints(opts.printer.colors())
                }
                Some(tools_error) => {
                    opts.printer.error(&format!("{:#}", e));
                    if let Some(hint) = tools_error.hint() {
                        eprintln!("\n{}", hint);
                    }
                }
                None => opts.printer.error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
