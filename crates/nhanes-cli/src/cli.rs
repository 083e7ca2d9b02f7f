//! CLI argument definitions for the `nhanes` converter.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use nhanes_convert::{BatchMode, ConvertOptions, DEFAULT_EXTENSION};
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "nhanes",
    version,
    about = "Convert NHANES SAS transport files to CSV",
    long_about = "Convert NHANES SAS transport (.xpt) files to CSV and describe their contents.\n\n\
                  Each file is parsed by the strict transport reader, then the lenient\n\
                  metadata reader, then the SAS7BDAT reader. The first that succeeds wins."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

impl Cli {
    /// `--log-level` beats `-v`/`-q`; either one disables `RUST_LOG`.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let explicit = self.log_level.map(LevelFilter::from);
        LogConfig {
            level_filter: explicit.unwrap_or_else(|| self.verbosity.tracing_level_filter()),
            use_env_filter: explicit.is_none() && !self.verbosity.is_present(),
            with_ansi: match self.color.color {
                ColorChoice::Always => true,
                ColorChoice::Never => false,
                ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
            },
            format: self.log_format.into(),
            log_file: self.log_file.clone(),
            ..LogConfig::default()
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Convert every input file to CSV.
    Convert(ConvertArgs),

    /// Write a text description next to every input file.
    Describe(DescribeArgs),

    /// Convert and describe every input file.
    Process(ProcessArgs),

    /// Print the description of a single file.
    Inspect(InspectArgs),
}

/// Arguments shared by the batch commands.
#[derive(Args)]
pub struct InputArgs {
    /// Directory containing the transport files.
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Extension of the input files, matched case-insensitively.
    #[arg(long = "extension", value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Also write the batch report as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory for the CSV files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "csv")]
    pub output_dir: PathBuf,
}

#[derive(Parser)]
pub struct DescribeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory for the descriptions (default: <INPUT_DIR>).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct ProcessArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory for the CSV files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "csv")]
    pub output_dir: PathBuf,

    /// Directory for the descriptions (default: <INPUT_DIR>).
    #[arg(long = "description-dir", value_name = "DIR")]
    pub description_dir: Option<PathBuf>,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Transport file to describe.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// A batch command resolved to what the converter needs.
pub struct BatchRequest<'a> {
    pub input: &'a InputArgs,
    pub mode: BatchMode,
    pub options: ConvertOptions,
}

impl Command {
    /// The batch request behind this command, or `None` for `inspect`.
    #[must_use]
    pub fn batch_request(&self) -> Option<BatchRequest<'_>> {
        let (input, mode, options) = match self {
            Self::Convert(args) => (
                &args.input,
                BatchMode::Convert,
                ConvertOptions::default().with_output_dir(&args.output_dir),
            ),
            Self::Describe(args) => (
                &args.input,
                BatchMode::Describe,
                ConvertOptions::default().with_description_dir(args.output_dir.clone()),
            ),
            Self::Process(args) => (
                &args.input,
                BatchMode::Both,
                ConvertOptions::default()
                    .with_output_dir(&args.output_dir)
                    .with_description_dir(args.description_dir.clone()),
            ),
            Self::Inspect(_) => return None,
        };
        Some(BatchRequest {
            input,
            mode,
            options: options.with_extension(input.extension.as_str()),
        })
    }
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

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => Self::ERROR,
            LogLevelArg::Warn => Self::WARN,
            LogLevelArg::Info => Self::INFO,
            LogLevelArg::Debug => Self::DEBUG,
            LogLevelArg::Trace => Self::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
