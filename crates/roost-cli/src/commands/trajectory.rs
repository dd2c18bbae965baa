use anyhow::Context;
use roost_config::RoostConfig;
use roost_engine::{Pipeline, TrajectoryRequest};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::TrajectoryArgs;
use crate::commands::inputs;
use crate::interrupt;
use crate::output::output;
use crate::progress::Progress;

/// Handle `roost trajectory`.
pub fn handle(
    args: &TrajectoryArgs,
    flags: &GlobalFlags,
    config: &RoostConfig,
) -> anyhow::Result<()> {
    let registry = inputs::load_registry(&args.input)?;
    let draws = inputs::load_draws(&args.prediction.draws)?;

    let years = if args.years.is_empty() {
        let (first, last) = registry
            .observed_span()
            .context("site table has no observed years")?;
        (first..=last).collect()
    } else {
        args.years.clone()
    };

    let request = TrajectoryRequest {
        site_ids: inputs::site_selection(&args.prediction),
        years,
        mode: args.prediction.mode.unwrap_or(config.run.mode),
        policy: args.prediction.extrapolation.unwrap_or(config.run.extrapolation),
        link: inputs::link(&args.prediction, config, &registry)?,
    };

    let pipeline = Pipeline::new(&registry, &draws)?
        .with_threads(args.prediction.threads.unwrap_or(config.run.threads));
    let progress = Progress::draws(pipeline.draw_count(), "trajectory");
    let tick = |finished: usize| progress.tick(finished);
    let cancel = interrupt::cancel_on_interrupt()?;

    let mut response =
        match pipeline.run_trajectory(&request, &cancel, Some(&tick)) {
            Ok(response) => {
                progress.finish_clear();
                response
            }
            Err(error) => {
                progress.finish_err("failed");
                return Err(error).context("trajectory run failed");
            }
        };

    if args.regional_only {
        response.sites.clear();
    }

    output(&response, flags.format)
}
