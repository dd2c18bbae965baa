use anyhow::Context;
use clap::Parser;
use roost_config::RoostConfig;

mod cli;
mod commands;
mod interrupt;
mod output;
mod progress;
mod ui;

fn main() {
    if let Err(error) = run() {
        eprintln!("roost error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    match &cli.command {
        cli::Commands::Change(args) => commands::change::handle(args, &flags, &load_config(&flags)?),
        cli::Commands::Trajectory(args) => {
            commands::trajectory::handle(args, &flags, &load_config(&flags)?)
        }
        cli::Commands::Sites(args) => commands::sites::handle(args, &flags),
        cli::Commands::Classify(args) => commands::classify::handle(args, &flags),
        cli::Commands::Schema(args) => commands::schema::handle(args, &flags),
    }
}

fn load_config(flags: &cli::GlobalFlags) -> anyhow::Result<RoostConfig> {
    RoostConfig::load_with_dotenv(flags.config.as_deref())
        .context("failed to load roost configuration")
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ROOST_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
