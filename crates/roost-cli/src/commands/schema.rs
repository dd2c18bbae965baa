use roost_core::entities::{DrawRecord, Observation, Site, Standardization};
use roost_core::responses::{ClassifyResponse, RunReport, SitesResponse, TrajectoryResponse};
use schemars::schema_for;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{SchemaArgs, SchemaType};
use crate::output::output_json;

/// Handle `roost schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let schema = match args.type_name {
        SchemaType::Observation => schema_for!(Observation),
        SchemaType::Site => schema_for!(Site),
        SchemaType::Standardization => schema_for!(Standardization),
        SchemaType::Draw => schema_for!(DrawRecord),
        SchemaType::Report => schema_for!(RunReport),
        SchemaType::Trajectory => schema_for!(TrajectoryResponse),
        SchemaType::Sites => schema_for!(SitesResponse),
        SchemaType::Classify => schema_for!(ClassifyResponse),
    };
    output_json(&schema, flags.format)
}
