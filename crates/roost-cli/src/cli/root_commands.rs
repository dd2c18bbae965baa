use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use roost_core::enums::{ExtrapolationPolicy, PredictionMode};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Posterior distribution of regional percent change between two years.
    Change(ChangeArgs),
    /// Per-site and regional expected-count trajectories.
    Trajectory(TrajectoryArgs),
    /// List registered sites with their standardized covariates.
    Sites(SitesArgs),
    /// Decline category of a percent-change value.
    Classify(ClassifyArgs),
    /// Dump JSON schema for an input record or response type.
    Schema(SchemaArgs),
}

/// Where the site table comes from.
#[derive(Clone, Debug, Args)]
pub struct InputArgs {
    /// Cleaned observations (JSONL); sites and standardization are derived.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["sites", "standardization"])]
    pub observations: Option<PathBuf>,

    /// Pre-standardized sites (JSONL). Requires `--standardization`.
    #[arg(long, value_name = "PATH", requires = "standardization")]
    pub sites: Option<PathBuf>,

    /// Fit-time standardization constants (JSON).
    #[arg(long, value_name = "PATH", requires = "sites")]
    pub standardization: Option<PathBuf>,
}

/// Prediction settings shared by `change` and `trajectory`.
#[derive(Clone, Debug, Args)]
pub struct PredictionArgs {
    /// Posterior draws (JSONL).
    #[arg(long, value_name = "PATH")]
    pub draws: PathBuf,

    /// Restrict to these sites (repeatable). Defaults to every site.
    #[arg(long = "site", value_name = "ID")]
    pub site_ids: Vec<String>,

    /// conditional (with site deviations) or marginal.
    #[arg(long)]
    pub mode: Option<PredictionMode>,

    /// include (flag only) or exclude extrapolated site-years from totals.
    #[arg(long)]
    pub extrapolation: Option<ExtrapolationPolicy>,

    /// Explicit ceiling on expected counts.
    #[arg(long, value_name = "COUNT")]
    pub max_expected_count: Option<f64>,

    /// Worker threads (0 = one per core).
    #[arg(long)]
    pub threads: Option<usize>,
}

/// Arguments for `roost change`.
#[derive(Clone, Debug, Args)]
pub struct ChangeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub prediction: PredictionArgs,

    /// Baseline year (defaults to the earliest observed year).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Comparison year (defaults to the latest observed year).
    #[arg(long)]
    pub end_year: Option<i32>,

    /// Quantile probability to report (repeatable).
    #[arg(long = "quantile", value_name = "P")]
    pub quantiles: Vec<f64>,

    /// Percent-change threshold for P(change <= threshold) (repeatable).
    #[arg(long = "threshold", value_name = "PCT", allow_hyphen_values = true)]
    pub thresholds: Vec<f64>,

    /// Write per-draw percent changes to this JSONL file.
    #[arg(long, value_name = "PATH")]
    pub draws_out: Option<PathBuf>,

    /// Keep per-draw values and regional totals in the printed report.
    #[arg(long)]
    pub full: bool,
}

/// Arguments for `roost trajectory`.
#[derive(Clone, Debug, Args)]
pub struct TrajectoryArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub prediction: PredictionArgs,

    /// Year to predict (repeatable). Defaults to every year of the observed span.
    #[arg(long = "year", value_name = "YEAR")]
    pub years: Vec<i32>,

    /// Only print the regional trajectory.
    #[arg(long)]
    pub regional_only: bool,
}

/// Arguments for `roost sites`.
#[derive(Clone, Debug, Args)]
pub struct SitesArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `roost classify`.
#[derive(Clone, Debug, Args)]
pub struct ClassifyArgs {
    /// Percent change, e.g. -42.5.
    #[arg(allow_negative_numbers = true)]
    pub percent_change: f64,
}

/// Types `roost schema` can describe.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaType {
    Observation,
    Site,
    Standardization,
    Draw,
    Report,
    Trajectory,
    Sites,
    Classify,
}

/// Arguments for `roost schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Type to describe.
    #[arg(value_enum)]
    pub type_name: SchemaType,
}
