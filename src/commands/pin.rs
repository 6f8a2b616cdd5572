use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::state;

use super::CmdResult;

#[derive(Args)]
pub struct PinArgs {
    #[command(subcommand)]
    command: PinCommand,
}

#[derive(Subcommand)]
enum PinCommand {
    /// Pin a trigger so it lists first
    Add {
        /// Trigger ID
        trigger_id: String,
    },
    /// Unpin a trigger
    Remove {
        /// Trigger ID
        trigger_id: String,
    },
    /// Flip a trigger's pin
    Toggle {
        /// Trigger ID
        trigger_id: String,
    },
    /// List pinned trigger ids
    List,
    /// Unpin everything
    Clear,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PinOutput {
    command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trigger_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<usize>,
    pinned_triggers: Vec<String>,
}

pub fn run_json(args: PinArgs) -> CmdResult<PinOutput> {
    let mut state = state::load_state()?;

    let (command, trigger_id, pinned, changed, removed) = match args.command {
        PinCommand::Add { trigger_id } => {
            let changed = state.pinned_triggers.pin(&trigger_id);
            ("pin.add", Some(trigger_id), Some(true), Some(changed), None)
        }
        PinCommand::Remove { trigger_id } => {
            let changed = state.pinned_triggers.unpin(&trigger_id);
            ("pin.remove", Some(trigger_id), Some(false), Some(changed), None)
        }
        PinCommand::Toggle { trigger_id } => {
            let now_pinned = state.pinned_triggers.toggle(&trigger_id);
            ("pin.toggle", Some(trigger_id), Some(now_pinned), Some(true), None)
        }
        PinCommand::List => ("pin.list", None, None, None, None),
        PinCommand::Clear => {
            let removed = state.pinned_triggers.clear();
            ("pin.clear", None, None, Some(removed > 0), Some(removed))
        }
    };

    if changed == Some(true) {
        state::save_state(&state)?;
    }

    Ok((
        PinOutput {
            command: command.to_string(),
            trigger_id,
            pinned,
            changed,
            removed,
            pinned_triggers: state.pinned_triggers.ids().to_vec(),
        },
        0,
    ))
}
