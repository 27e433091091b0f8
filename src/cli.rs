// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `shardplan`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "shardplan",
    version,
    about = "Turn a task-graph plan into a per-node command graph.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the plan file (TOML).
    ///
    /// Default: `Shardplan.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Shardplan.toml")]
    pub plan: String,

    /// Parse + validate, print the plan, but don't synthesize anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print the synthesized command graph as graphviz on stdout.
    #[arg(long)]
    pub emit_dot: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SHARDPLAN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
