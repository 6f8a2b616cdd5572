use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::gcloud::Project;
use triggerdeck::state;

use super::CmdResult;

#[derive(Args)]
pub struct ProjectsArgs {
    #[command(subcommand)]
    command: ProjectsCommand,
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// List projects visible to the active gcloud account
    List,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsOutput {
    command: String,
    projects: Vec<ProjectRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_project: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProjectRow {
    #[serde(flatten)]
    project: Project,
    selected: bool,
}

pub fn run(args: ProjectsArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<ProjectsOutput> {
    match args.command {
        ProjectsCommand::List => list(),
    }
}

fn list() -> CmdResult<ProjectsOutput> {
    let config = defaults::load_config();
    let state = state::load_state()?;
    let projects = super::client(&config).list_projects()?;

    let selected = state.selected_project.clone();
    let projects = projects
        .into_iter()
        .map(|project| ProjectRow {
            selected: selected.as_deref() == Some(project.id.as_str()),
            project,
        })
        .collect();

    Ok((
        ProjectsOutput {
            command: "projects.list".to_string(),
            projects,
            selected_project: selected,
        },
        0,
    ))
}
