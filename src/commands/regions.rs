use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::regions::{self, Region};
use triggerdeck::state;

use super::CmdResult;

#[derive(Args)]
pub struct RegionsArgs {
    #[command(subcommand)]
    command: RegionsCommand,
}

#[derive(Subcommand)]
enum RegionsCommand {
    /// List Cloud Build regions
    List,
}

#[derive(Debug, Serialize)]
pub struct RegionsOutput {
    command: String,
    regions: Vec<RegionRow>,
    current: String,
}

#[derive(Debug, Serialize)]
pub struct RegionRow {
    #[serde(flatten)]
    region: Region,
    current: bool,
}

pub fn run_json(args: RegionsArgs) -> CmdResult<RegionsOutput> {
    match args.command {
        RegionsCommand::List => list(),
    }
}

fn list() -> CmdResult<RegionsOutput> {
    let config = defaults::load_config();
    let current = state::load_state()?.resolve_region(None, &config.defaults);

    let regions = regions::REGIONS
        .iter()
        .map(|region| RegionRow {
            region: *region,
            current: region.id == current,
        })
        .collect();

    Ok((
        RegionsOutput {
            command: "regions.list".to_string(),
            regions,
            current,
        },
        0,
    ))
}
