use anyhow::Context;
use roost_core::enums::DeclineCategory;
use roost_core::responses::ClassifyResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ClassifyArgs;
use crate::output::output;

/// Handle `roost classify`.
pub fn handle(args: &ClassifyArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let category = DeclineCategory::classify(args.percent_change)
        .context("percent change must be a number")?;
    output(
        &ClassifyResponse {
            percent_change: args.percent_change,
            category,
        },
        flags.format,
    )
}
