use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::gcloud::{CommandRunner, GcloudClient, Trigger};
use triggerdeck::pins::{PinStats, Pins};
use triggerdeck::state;

use super::{CmdResult, ScopeArgs};

#[derive(Args)]
pub struct TriggersArgs {
    #[command(subcommand)]
    command: TriggersCommand,
}

#[derive(Subcommand)]
enum TriggersCommand {
    /// List build triggers, pinned triggers first
    List {
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Show one trigger by id or name
    Show {
        /// Trigger ID or name
        trigger: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggersOutput {
    command: String,
    project_id: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    triggers: Option<Vec<TriggerRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger: Option<TriggerRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<PinStats>,
}

#[derive(Debug, Serialize)]
pub struct TriggerRow {
    #[serde(flatten)]
    pub trigger: Trigger,
    pub pinned: bool,
}

pub fn run(args: TriggersArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<TriggersOutput> {
    let config = defaults::load_config();
    let state = state::load_state()?;
    let client = super::client(&config);

    match args.command {
        TriggersCommand::List { scope } => {
            let project_id = state.resolve_project(scope.project())?;
            let region = state.resolve_region(scope.region(), &config.defaults);
            let (triggers, stats) =
                list_rows(&client, &state.pinned_triggers, &project_id, &region)?;

            Ok((
                TriggersOutput {
                    command: "triggers.list".to_string(),
                    project_id,
                    region,
                    triggers: Some(triggers),
                    trigger: None,
                    stats: Some(stats),
                },
                0,
            ))
        }
        TriggersCommand::Show { trigger, scope } => {
            let project_id = state.resolve_project(scope.project())?;
            let region = state.resolve_region(scope.region(), &config.defaults);
            let found = client.find_trigger(&project_id, &region, &trigger)?;

            Ok((
                TriggersOutput {
                    command: "triggers.show".to_string(),
                    project_id,
                    region,
                    triggers: None,
                    trigger: Some(TriggerRow {
                        pinned: state.pinned_triggers.is_pinned(&found.id),
                        trigger: found,
                    }),
                    stats: None,
                },
                0,
            ))
        }
    }
}

/// Triggers in listing order with pinned ones moved to the front.
pub(crate) fn list_rows<R: CommandRunner>(
    client: &GcloudClient<R>,
    pins: &Pins,
    project_id: &str,
    region: &str,
) -> triggerdeck::Result<(Vec<TriggerRow>, PinStats)> {
    let triggers = client.list_triggers(project_id, region)?;
    let stats = pins.stats(&triggers);

    let (pinned, unpinned): (Vec<_>, Vec<_>) =
        triggers.into_iter().partition(|t| pins.is_pinned(&t.id));

    let rows = pinned
        .into_iter()
        .map(|trigger| TriggerRow {
            trigger,
            pinned: true,
        })
        .chain(unpinned.into_iter().map(|trigger| TriggerRow {
            trigger,
            pinned: false,
        }))
        .collect();

    Ok((rows, stats))
}
