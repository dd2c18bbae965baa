use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat, ProgressMode};
pub use root_commands::Commands;

/// Top-level CLI parser for the `roost` binary.
#[derive(Debug, Parser)]
#[command(
    name = "roost",
    version,
    about = "Roost - regional trends from posterior draws of a hierarchical count model"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Progress bar: auto, on, off
    #[arg(long, global = true, default_value = "auto")]
    pub progress: ProgressMode,

    /// Extra config file layered over the user and project files
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            progress: self.progress,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::{CommandFactory, Parser};
    use roost_core::enums::{ExtrapolationPolicy, PredictionMode};

    use super::root_commands::SchemaType;
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["roost", "--format", "table", "--verbose", "classify", "-12"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Classify(_)));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["roost", "schema", "report", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(
            cli.command,
            Commands::Schema(ref args) if args.type_name == SchemaType::Report
        ));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        assert!(Cli::try_parse_from(["roost", "--format", "xml", "classify", "3"]).is_err());
    }

    #[test]
    fn negative_percent_change_is_a_value() {
        let cli = Cli::try_parse_from(["roost", "classify", "-55"]).expect("cli should parse");
        let Commands::Classify(args) = cli.command else {
            panic!("expected classify");
        };
        assert!((args.percent_change + 55.0).abs() < f64::EPSILON);
    }

    #[test]
    fn change_args_parse_with_repeated_options() {
        let cli = Cli::try_parse_from([
            "roost",
            "change",
            "--observations",
            "obs.jsonl",
            "--draws",
            "draws.jsonl",
            "--start-year",
            "2000",
            "--end-year",
            "2019",
            "--site",
            "A",
            "--site",
            "B",
            "--mode",
            "marginal",
            "--extrapolation",
            "exclude",
            "--threshold",
            "-30",
            "--threshold",
            "-50",
            "--quantile",
            "0.1",
        ])
        .expect("cli should parse");

        let Commands::Change(args) = cli.command else {
            panic!("expected change");
        };
        assert_eq!(args.prediction.site_ids, vec!["A", "B"]);
        assert_eq!(args.prediction.mode, Some(PredictionMode::Marginal));
        assert_eq!(
            args.prediction.extrapolation,
            Some(ExtrapolationPolicy::Exclude)
        );
        assert_eq!(args.thresholds, vec![-30.0, -50.0]);
        assert_eq!(args.start_year, Some(2000));
        assert_eq!(args.input.observations.as_deref(), Some(Path::new("obs.jsonl")));
    }

    #[test]
    fn sites_table_needs_standardization() {
        let parsed = Cli::try_parse_from(["roost", "sites", "--sites", "sites.jsonl"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "roost",
            "sites",
            "--observations",
            "obs.jsonl",
            "--sites",
            "sites.jsonl",
            "--standardization",
            "st.json",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["roost", "--config", "/tmp/roost.toml", "classify", "1"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.config.as_deref(), Some(Path::new("/tmp/roost.toml")));
    }
}
