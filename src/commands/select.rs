use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::regions;
use triggerdeck::state::{self, State};

use super::CmdResult;

#[derive(Args)]
pub struct SelectArgs {
    #[command(subcommand)]
    command: SelectCommand,
}

#[derive(Subcommand)]
enum SelectCommand {
    /// Show the current selection with defaults applied
    Show,
    /// Select the working project
    Project {
        /// Project ID
        project_id: String,
    },
    /// Select the working region
    Region {
        /// Region ID, or "global"
        region: String,
    },
    /// Select the branch used for runs
    Branch {
        /// Branch name
        branch: String,
    },
    /// Forget the selection (overrides and pins are kept)
    Reset {
        /// Also forget substitution overrides and pins (deletes state.json)
        #[arg(long)]
        all: bool,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectOutput {
    command: String,
    project_id: Option<String>,
    region: String,
    region_name: String,
    branch: String,
}

pub fn run_json(args: SelectArgs) -> CmdResult<SelectOutput> {
    let mut state = state::load_state()?;

    let command = match args.command {
        SelectCommand::Show => "select.show",
        SelectCommand::Project { project_id } => {
            state.selected_project = Some(non_empty("project_id", &project_id)?);
            state::save_state(&state)?;
            "select.project"
        }
        SelectCommand::Region { region } => {
            state.selected_region = Some(validate_region(&region)?);
            state::save_state(&state)?;
            "select.region"
        }
        SelectCommand::Branch { branch } => {
            state.selected_branch = Some(non_empty("branch", &branch)?);
            state::save_state(&state)?;
            "select.branch"
        }
        SelectCommand::Reset { all: true } => {
            state::reset_state()?;
            state = State::default();
            "select.reset"
        }
        SelectCommand::Reset { all: false } => {
            state.selected_project = None;
            state.selected_region = None;
            state.selected_branch = None;
            state::save_state(&state)?;
            "select.reset"
        }
    };

    Ok((describe(command, &state), 0))
}

fn describe(command: &str, state: &State) -> SelectOutput {
    let config = defaults::load_config();
    let region = state.resolve_region(None, &config.defaults);

    SelectOutput {
        command: command.to_string(),
        project_id: state.resolve_project(None).ok(),
        region_name: regions::display_name(&region).to_string(),
        region,
        branch: state.resolve_branch(None, &config.defaults),
    }
}

fn non_empty(field: &str, value: &str) -> triggerdeck::Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(triggerdeck::Error::validation_invalid_argument(
            field,
            "Value cannot be empty",
            None,
            None,
        ));
    }
    Ok(trimmed.to_string())
}

fn validate_region(region: &str) -> triggerdeck::Result<String> {
    let region = region.trim();
    match regions::find(region) {
        Some(found) => Ok(found.id.to_string()),
        None => Err(triggerdeck::Error::validation_invalid_argument(
            "region",
            format!("Unknown region '{}'", region),
            Some(region.to_string()),
            Some(regions::ids()),
        )
        .with_hint("Run 'triggerdeck regions list' to see available regions")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_are_accepted() {
        assert_eq!(validate_region(" europe-west1 ").unwrap(), "europe-west1");
        assert_eq!(validate_region("global").unwrap(), "global");
    }

    #[test]
    fn unknown_region_lists_alternatives() {
        let err = validate_region("mars-north1").unwrap_err();
        assert_eq!(err.code, triggerdeck::ErrorCode::ValidationInvalidArgument);
        assert!(err.details["tried"]
            .as_array()
            .map(|ids| ids.iter().any(|id| id == "us-central1"))
            .unwrap_or(false));
        assert_eq!(err.hints.len(), 1);
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(non_empty("branch", "  ").is_err());
        assert_eq!(non_empty("branch", " dev ").unwrap(), "dev");
    }
}
