//! CLI argument definitions for stattab.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use regex::Regex;

use stattab_ingest::Separator;

#[derive(Parser)]
#[command(
    name = "stattab",
    version,
    about = "Render delimited stats tables as chroma-scaled HTML",
    long_about = "Load a delimited text file of per-sample statistics and render it\n\
                  as a normalized, color-scaled HTML table fragment for embedding\n\
                  in a report page."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a delimited file and write the rendered HTML fragment.
    Render(RenderArgs),

    /// Load a delimited file and print its schema and row count.
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct SeparatorArgs {
    /// Field separator as a regex pattern (default: any tab, space or comma).
    #[arg(long = "sep", value_name = "PATTERN", conflicts_with = "literal_sep")]
    pub sep: Option<String>,

    /// Field separator as a literal token rather than a pattern.
    #[arg(long = "literal-sep", value_name = "TOKEN")]
    pub literal_sep: Option<String>,
}

impl SeparatorArgs {
    pub fn to_separator(&self) -> Result<Separator> {
        if let Some(token) = &self.literal_sep {
            return Ok(Separator::Literal(token.clone()));
        }
        match &self.sep {
            Some(pattern) => {
                let regex = Regex::new(pattern)
                    .with_context(|| format!("invalid separator pattern {pattern:?}"))?;
                Ok(Separator::Pattern(regex))
            }
            None => Ok(Separator::default_pattern()),
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Path to the delimited input file (first line is the header).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Table identifier used as the <table> element id (default: file stem).
    #[arg(long = "table-name", value_name = "NAME")]
    pub table_name: Option<String>,

    #[command(flatten)]
    pub separator: SeparatorArgs,

    /// Write the HTML fragment here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Path to the delimited input file (first line is the header).
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Table identifier (default: file stem).
    #[arg(long = "table-name", value_name = "NAME")]
    pub table_name: Option<String>,

    #[command(flatten)]
    pub separator: SeparatorArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
