use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::build::{self, BuildSummary};
use triggerdeck::defaults;
use triggerdeck::state;

use super::{CmdResult, ScopeArgs};

#[derive(Args)]
pub struct BuildsArgs {
    #[command(subcommand)]
    command: BuildsCommand,
}

#[derive(Subcommand)]
enum BuildsCommand {
    /// List recent builds
    List {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Maximum number of builds (defaults to recentBuildsLimit)
        #[arg(long, short = 'n')]
        limit: Option<u32>,
    },
    /// Show one build
    Show {
        /// Build ID
        build_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Poll a build until it finishes
    Wait {
        /// Build ID
        build_id: String,
        #[command(flatten)]
        scope: ScopeArgs,
        /// Seconds between polls (defaults to pollIntervalSecs)
        #[arg(long)]
        interval: Option<u64>,
        /// Give up after this many seconds (defaults to pollTimeoutSecs)
        #[arg(long)]
        timeout: Option<u64>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildsOutput {
    command: String,
    project_id: String,
    region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    builds: Option<Vec<BuildSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<BuildSummary>,
}

pub fn run(args: BuildsArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<BuildsOutput> {
    let config = defaults::load_config();
    let state = state::load_state()?;
    let client = super::client(&config);

    match args.command {
        BuildsCommand::List { scope, limit } => {
            let project_id = state.resolve_project(scope.project())?;
            let region = state.resolve_region(scope.region(), &config.defaults);
            let limit = limit.unwrap_or(config.defaults.recent_builds_limit);
            let builds = client.list_builds(&project_id, &region, limit)?;

            Ok((
                BuildsOutput {
                    command: "builds.list".to_string(),
                    project_id,
                    region,
                    builds: Some(builds),
                    build: None,
                },
                0,
            ))
        }
        BuildsCommand::Show { build_id, scope } => {
            let project_id = state.resolve_project(scope.project())?;
            let region = state.resolve_region(scope.region(), &config.defaults);
            let summary = client.describe_build(&project_id, &region, &build_id)?;

            Ok((
                BuildsOutput {
                    command: "builds.show".to_string(),
                    project_id,
                    region,
                    builds: None,
                    build: Some(summary),
                },
                0,
            ))
        }
        BuildsCommand::Wait {
            build_id,
            scope,
            interval,
            timeout,
        } => {
            let project_id = state.resolve_project(scope.project())?;
            let region = state.resolve_region(scope.region(), &config.defaults);

            let mut options = config.defaults.wait_options();
            if let Some(secs) = interval {
                options.interval = std::time::Duration::from_secs(secs);
            }
            if let Some(secs) = timeout {
                options.timeout = std::time::Duration::from_secs(secs);
            }

            let summary = build::wait_for_build(
                &client,
                &project_id,
                &region,
                &build_id,
                options,
                std::thread::sleep,
            )?;
            if !summary.status.is_success() {
                return Err(triggerdeck::Error::build_unsuccessful(
                    &summary.id,
                    summary.status.as_str(),
                ));
            }

            Ok((
                BuildsOutput {
                    command: "builds.wait".to_string(),
                    project_id,
                    region,
                    builds: None,
                    build: Some(summary),
                },
                0,
            ))
        }
    }
}
