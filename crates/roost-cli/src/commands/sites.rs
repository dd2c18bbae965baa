use roost_core::responses::SitesResponse;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SitesArgs;
use crate::commands::inputs;
use crate::output::output;

/// Handle `roost sites`.
pub fn handle(args: &SitesArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = inputs::load_registry(&args.input)?;
    let response = SitesResponse {
        standardization: registry.standardization().clone(),
        sites: registry.sites().cloned().collect(),
    };
    output(&response, flags.format)
}
