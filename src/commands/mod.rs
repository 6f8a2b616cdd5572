use clap::Args;
use serde_json::Value;

use triggerdeck::defaults::AppConfig;
use triggerdeck::gcloud::GcloudClient;

pub type CmdResult<T> = triggerdeck::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Project and region flags shared by every command that talks to Cloud Build.
///
/// Both fall back to the persisted selection, then to configured defaults.
#[derive(Args, Default, Debug, Clone)]
pub struct ScopeArgs {
    /// Project ID (defaults to the selected project)
    #[arg(long, short = 'p')]
    pub project: Option<String>,

    /// Region ID, or "global" (defaults to the selected region)
    #[arg(long, short = 'r')]
    pub region: Option<String>,
}

impl ScopeArgs {
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

/// gcloud client honoring the configured identifier quoting.
pub(crate) fn client(config: &AppConfig) -> GcloudClient {
    GcloudClient::shell(config.defaults.identifier_quoting)
}

/// Parse a JSON value given on the command line.
pub(crate) fn parse_json_arg(raw: &str, context: &str) -> triggerdeck::Result<Value> {
    serde_json::from_str(raw)
        .map_err(|e| triggerdeck::Error::validation_invalid_json(e, Some(context.to_string())))
}

pub mod auth;
pub mod builds;
pub mod config;
pub mod pin;
pub mod projects;
pub mod regions;
pub mod run;
pub mod select;
pub mod subs;
pub mod triggers;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run_json($args))
    };
    ($args:expr, $global:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args, $global))
    };
}

pub(crate) fn run_json(
    command: crate::Commands,
    global: &GlobalArgs,
) -> (triggerdeck::Result<serde_json::Value>, i32) {
    crate::tty::status("triggerdeck is working...");

    match command {
        // Local bookkeeping, no gcloud calls
        crate::Commands::Regions(args) => dispatch!(args, regions),
        crate::Commands::Pin(args) => dispatch!(args, pin),
        crate::Commands::Select(args) => dispatch!(args, select),
        crate::Commands::Config(args) => dispatch!(args, config),

        // Commands that shell out to gcloud
        crate::Commands::Auth(args) => dispatch!(args, global, auth),
        crate::Commands::Projects(args) => dispatch!(args, global, projects),
        crate::Commands::Triggers(args) => dispatch!(args, global, triggers),
        crate::Commands::Run(args) => dispatch!(args, global, run),
        crate::Commands::Builds(args) => dispatch!(args, global, builds),
        crate::Commands::Subs(args) => dispatch!(args, global, subs),
    }
}
