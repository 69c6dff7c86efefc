//! CLI argument definitions for `georef`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use georef_geometry::CrsVariant;

#[derive(Parser)]
#[command(
    name = "georef",
    version,
    about = "Normalize record frames of reference and inspect GeoJSON payloads",
    long_about = "Normalize the units and date/time values of records to SI and ISO 8601,\n\
                  driven by each record's meta block.\n\n\
                  Also inspects GeoJSON documents exchanged with a CRS conversion service."
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

    /// Include record values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize units and date/time values of a batch of records.
    Normalize(NormalizeArgs),

    /// Report validity, dimension and bounding box of a GeoJSON document.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// JSON file holding an array of records, or a single record.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write normalized records here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Skip unit normalization.
    #[arg(long = "no-units")]
    pub no_units: bool,

    /// Skip date/time normalization.
    #[arg(long = "no-dates")]
    pub no_dates: bool,

    /// Exit with status 1 when any record ends in the error status.
    #[arg(long = "fail-on-error")]
    pub fail_on_error: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// GeoJSON document to inspect.
    #[arg(value_name = "GEOJSON")]
    pub input: PathBuf,

    /// Retag every node and print the retagged document.
    #[arg(long = "retag", value_enum)]
    pub retag: Option<VariantArg>,

    /// Write the retagged document here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH", requires = "retag")]
    pub output: Option<PathBuf>,
}

/// CRS variant choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum VariantArg {
    /// Not yet reprojected (`AnyCrs` prefix).
    Anycrs,
    /// Canonical GeoJSON.
    Geojson,
}

impl From<VariantArg> for CrsVariant {
    fn from(value: VariantArg) -> Self {
        match value {
            VariantArg::Anycrs => CrsVariant::AnyCrs,
            VariantArg::Geojson => CrsVariant::GeoJson,
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
