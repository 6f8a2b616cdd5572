use clap::{Parser, Subcommand};

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{auth, builds, config, pin, projects, regions, run, select, subs, triggers};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "triggerdeck")]
#[command(version = VERSION)]
#[command(about = "Browse and run Google Cloud Build triggers through gcloud")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active gcloud account
    Auth(auth::AuthArgs),
    /// List Google Cloud projects
    Projects(projects::ProjectsArgs),
    /// List Cloud Build regions
    Regions(regions::RegionsArgs),
    /// List and inspect build triggers
    Triggers(triggers::TriggersArgs),
    /// Run a build trigger
    Run(run::RunArgs),
    /// Inspect and wait for builds
    Builds(builds::BuildsArgs),
    /// Manage per-trigger substitution overrides
    #[command(visible_alias = "substitutions")]
    Subs(subs::SubsArgs),
    /// Pin triggers so they list first
    Pin(pin::PinArgs),
    /// Select the working project, region and branch
    Select(select::SelectArgs),
    /// Manage global triggerdeck configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if let Err(err) = output::print_json_result(json_result) {
        eprintln!("{}", err);
        return std::process::ExitCode::from(exit_code_to_u8(1));
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
