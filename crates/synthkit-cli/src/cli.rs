//! CLI argument definitions for synthkit.

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use synthkit_ise::FlowKind;
use tracing::level_filters::LevelFilter;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "synthkit",
    version,
    about = "Synthesise FPGA designs with Xilinx ISE",
    long_about = "Synthesise FPGA designs with Xilinx ISE.\n\n\
                  Generates the ISE project and constraints files from a TOML project,\n\
                  runs the ISE tools up to a PROM image and archives every run."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

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
    /// Synthesise one or more entities of a project.
    Synth(SynthArgs),

    /// Report toolchain availability and the project's synthesis libraries.
    Check(CheckArgs),
}

#[derive(Parser)]
pub struct SynthArgs {
    /// Path to the TOML project file.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Library containing the entities.
    #[arg(long, short = 'l', default_value = "work")]
    pub library: String,

    /// Top-level entity to synthesise; repeat for several.
    #[arg(long = "entity", short = 'e', value_name = "ENTITY", required = true)]
    pub entities: Vec<String>,

    /// FPGA part (default: the project's part).
    #[arg(long, short = 'p')]
    pub part: Option<String>,

    /// Flow to run (default: the project's flow, or manual).
    #[arg(long, value_enum)]
    pub flow: Option<FlowArg>,

    /// Directory holding the ISE executables (default: the project's tool_path, then PATH).
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_path: Option<PathBuf>,

    /// Write a JSON report of the results.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

#[derive(Parser)]
pub struct CheckArgs {
    /// Path to the TOML project file.
    #[arg(value_name = "PROJECT")]
    pub project: PathBuf,

    /// Directory holding the ISE executables.
    #[arg(long = "tool-path", value_name = "DIR")]
    pub tool_path: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FlowArg {
    /// xst, ngdbuild, map, par and bitgen one after another.
    Manual,
    /// A single xflow call.
    Xflow,
}

impl From<FlowArg> for FlowKind {
    fn from(value: FlowArg) -> Self {
        match value {
            FlowArg::Manual => FlowKind::Manual,
            FlowArg::Xflow => FlowKind::Xflow,
        }
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

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl Cli {
    /// Build logging configuration from CLI flags with consistent precedence:
    /// `--log-level`, then `-v/-q`, then `RUST_LOG`, then info.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let mut config = LogConfig {
            level_filter: self.verbosity.tracing_level_filter(),
            use_env_filter: !(self.verbosity.is_present() || self.log_level.is_some()),
            ..LogConfig::default()
        };
        if let Some(level) = self.log_level {
            config.level_filter = match level {
                LogLevelArg::Error => LevelFilter::ERROR,
                LogLevelArg::Warn => LevelFilter::WARN,
                LogLevelArg::Info => LevelFilter::INFO,
                LogLevelArg::Debug => LevelFilter::DEBUG,
                LogLevelArg::Trace => LevelFilter::TRACE,
            };
        }
        config.format = match self.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        config.log_file = self.log_file.clone();
        config.with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && io::stderr().is_terminal(),
        };
        config
    }
}
