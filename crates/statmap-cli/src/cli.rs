//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use statmap_model::{DataSetVersionId, GeographicLevel, MappingType, ModelError};

#[derive(Parser)]
#[command(
    name = "statmap",
    version,
    about = "Map a live statistical data set version onto its replacement",
    long_about = "Map the locations, filters and indicators of a live data set version onto \
                  the version replacing it.\n\n\
                  Auto-maps records once on creation, lets reviewers override single \
                  entries, and reports what is still unmapped."
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

#[derive(Subcommand)]
pub enum Command {
    /// Auto-map a live version onto its replacement and store the record.
    Create(CreateArgs),

    /// Apply a reviewer's decision to one mapping entry.
    Override(OverrideArgs),

    /// Show the review of a stored mapping record.
    Review(ReviewArgs),

    /// List stored mapping records.
    List(StoreArgs),

    /// Expand selected filter options along the filter hierarchies.
    Reconcile(ReconcileArgs),

    /// Delete a stored mapping record.
    Delete(VersionArgs),
}

#[derive(Args)]
pub struct StoreArgs {
    /// Directory holding mapping records.
    #[arg(long = "store", value_name = "DIR")]
    pub store: PathBuf,
}

#[derive(Args)]
pub struct VersionArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Id of the data set version the record belongs to (the new version).
    #[arg(long = "version-id", value_name = "ID", value_parser = parse_version_id)]
    pub version: DataSetVersionId,
}

#[derive(Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Id of the live version.
    #[arg(long = "source-version", value_name = "ID", value_parser = parse_version_id)]
    pub source_version: DataSetVersionId,

    /// Metadata JSON of the live version.
    #[arg(long = "source", value_name = "FILE")]
    pub source: PathBuf,

    /// Id of the version replacing it.
    #[arg(long = "target-version", value_name = "ID", value_parser = parse_version_id)]
    pub target_version: DataSetVersionId,

    /// Metadata JSON of the version replacing it.
    #[arg(long = "target", value_name = "FILE")]
    pub target: PathBuf,

    /// Compare labels case-insensitively.
    #[arg(long = "ignore-label-case")]
    pub ignore_label_case: bool,

    /// Do not let a location's previous code match.
    #[arg(long = "no-old-codes")]
    pub no_old_codes: bool,
}

#[derive(Args)]
pub struct OverrideArgs {
    #[command(flatten)]
    pub record: VersionArgs,

    #[command(subcommand)]
    pub target: OverrideTarget,
}

#[derive(Subcommand)]
pub enum OverrideTarget {
    /// A location option of one geographic level.
    Location {
        /// Geographic level code (LA, REG, SCH, ...).
        #[arg(long = "level", value_name = "CODE")]
        level: GeographicLevel,

        #[command(flatten)]
        entry: EntryArgs,
    },
    /// An option of a filter column.
    Filter {
        /// Key of the filter column in the live version.
        #[arg(long = "filter", value_name = "KEY")]
        filter_key: String,

        #[command(flatten)]
        entry: EntryArgs,
    },
    /// An indicator.
    Indicator {
        #[command(flatten)]
        entry: EntryArgs,
    },
}

#[derive(Args)]
pub struct EntryArgs {
    /// Key of the entry in the live version.
    #[arg(long = "source-key", value_name = "KEY")]
    pub source_key: String,

    /// Reviewer decision.
    #[arg(long = "type", value_enum)]
    pub mapping_type: ManualTypeArg,

    /// Candidate key in the new version (required for manual-mapped).
    #[arg(long = "candidate", value_name = "KEY")]
    pub candidate: Option<String>,
}

#[derive(Args)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub record: VersionArgs,

    /// Print the review as JSON instead of tables.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct ReconcileArgs {
    /// Metadata JSON holding filters and filter hierarchies.
    #[arg(long = "meta", value_name = "FILE")]
    pub meta: PathBuf,

    /// Selected filter option ids.
    #[arg(long = "selected", value_name = "ID", num_args = 1.., required = true)]
    pub selected: Vec<String>,

    /// Print the flat id list sent to the query engine.
    #[arg(long = "flat")]
    pub flat: bool,
}

/// Mapping types a reviewer may set.
#[derive(Clone, Copy, ValueEnum)]
pub enum ManualTypeArg {
    ManualMapped,
    ManualNone,
}

impl From<ManualTypeArg> for MappingType {
    fn from(value: ManualTypeArg) -> Self {
        match value {
            ManualTypeArg::ManualMapped => MappingType::ManualMapped,
            ManualTypeArg::ManualNone => MappingType::ManualNone,
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

fn parse_version_id(value: &str) -> Result<DataSetVersionId, ModelError> {
    DataSetVersionId::new(value)
}
