use anyhow::Context;
use roost_config::RoostConfig;
use roost_engine::{ChangeRequest, Pipeline, SummaryOptions, io};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ChangeArgs;
use crate::commands::inputs;
use crate::interrupt;
use crate::output::output;
use crate::progress::Progress;

/// Handle `roost change`.
pub fn handle(args: &ChangeArgs, flags: &GlobalFlags, config: &RoostConfig) -> anyhow::Result<()> {
    let registry = inputs::load_registry(&args.input)?;
    let draws = inputs::load_draws(&args.prediction.draws)?;
    let (first, last) = registry
        .observed_span()
        .context("site table has no observed years")?;

    let request = ChangeRequest {
        start_year: args.start_year.or(config.change.start_year).unwrap_or(first),
        end_year: args.end_year.or(config.change.end_year).unwrap_or(last),
        site_ids: inputs::site_selection(&args.prediction),
        mode: args.prediction.mode.unwrap_or(config.run.mode),
        policy: args.prediction.extrapolation.unwrap_or(config.run.extrapolation),
        summary: SummaryOptions {
            quantiles: inputs::list_or(&args.quantiles, &config.change.quantiles),
            thresholds: inputs::list_or(&args.thresholds, &config.change.thresholds),
            max_dropped_fraction: config.change.max_dropped_fraction,
        },
        link: inputs::link(&args.prediction, config, &registry)?,
    };

    let pipeline = Pipeline::new(&registry, &draws)?
        .with_threads(args.prediction.threads.unwrap_or(config.run.threads));
    let progress = Progress::draws(pipeline.draw_count(), "change");
    let tick = |finished: usize| progress.tick(finished);
    let cancel = interrupt::cancel_on_interrupt()?;

    let mut report = match pipeline.run_change(&request, &cancel, Some(&tick)) {
        Ok(report) => {
            progress.finish_clear();
            report
        }
        Err(error) => {
            progress.finish_err("failed");
            return Err(error).context("change run failed");
        }
    };

    if let Some(path) = &args.draws_out {
        io::write_draw_changes(path, &report.draws)?;
        tracing::info!(path = %path.display(), draws = report.draws.len(), "per-draw changes written");
    }
    if !args.full {
        report.draws.clear();
        report.totals.clear();
    }

    output(&report, flags.format)
}
