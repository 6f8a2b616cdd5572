use clap::Args;
use serde::Serialize;

use triggerdeck::build::{self, BuildSummary};
use triggerdeck::defaults::{self, Defaults};
use triggerdeck::invocation::BuildInvocation;
use triggerdeck::state::{self, State};
use triggerdeck::substitution::{self, SubstitutionMap};

use super::{CmdResult, ScopeArgs};

#[derive(Args)]
pub struct RunArgs {
    /// Trigger ID
    pub trigger_id: String,

    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Branch to build (defaults to the selected branch)
    #[arg(long, short = 'b')]
    pub branch: Option<String>,

    /// Substitution for this run only, as KEY=VALUE (repeatable).
    /// Overrides any stored value for the same key.
    #[arg(long = "sub", value_name = "KEY=VALUE")]
    pub subs: Vec<String>,

    /// Print the gcloud command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Wait for the build to finish
    #[arg(long, conflicts_with = "dry_run")]
    pub wait: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    command: String,
    invocation: BuildInvocation,
    gcloud_command: String,
    dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    build_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<BuildSummary>,
}

pub fn run(args: RunArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<RunOutput> {
    let config = defaults::load_config();
    let state = state::load_state()?;
    let invocation = plan(&state, &config.defaults, &args)?;

    let client = super::client(&config);
    let gcloud_command = invocation.to_command(client.quoting());

    if args.dry_run {
        return Ok((
            RunOutput {
                command: "run".to_string(),
                invocation,
                gcloud_command,
                dry_run: true,
                build_id: None,
                log_url: None,
                build: None,
            },
            0,
        ));
    }

    let started = client.run_trigger(&invocation)?;

    let build = if args.wait {
        let summary = build::wait_for_build(
            &client,
            &invocation.project_id,
            &invocation.region,
            &started.build_id,
            config.defaults.wait_options(),
            std::thread::sleep,
        )?;
        if !summary.status.is_success() {
            return Err(triggerdeck::Error::build_unsuccessful(
                &summary.id,
                summary.status.as_str(),
            ));
        }
        Some(summary)
    } else {
        None
    };

    Ok((
        RunOutput {
            command: "run".to_string(),
            invocation,
            gcloud_command,
            dry_run: false,
            build_id: Some(started.build_id),
            log_url: started.log_url,
            build,
        },
        0,
    ))
}

/// Resolve the invocation: scope from flags, selection and defaults;
/// substitutions are the stored overrides with `--sub` flags on top.
fn plan(state: &State, defaults: &Defaults, args: &RunArgs) -> triggerdeck::Result<BuildInvocation> {
    let selection = state.resolve(
        args.scope.project(),
        args.scope.region(),
        args.branch.as_deref(),
        defaults,
    )?;

    let mut substitutions = state.substitutions_for(&args.trigger_id);
    let mut flagged = SubstitutionMap::new();
    for raw in &args.subs {
        let (key, value) = substitution::parse_assignment(raw)?;
        flagged.insert(key, value);
    }
    substitutions.overlay(&flagged);

    Ok(BuildInvocation {
        trigger_id: args.trigger_id.clone(),
        project_id: selection.project_id,
        region: selection.region,
        branch: selection.branch,
        substitutions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use triggerdeck::invocation::IdentifierQuoting;
    use triggerdeck::substitution::ScalarValue;

    fn args(subs: &[&str]) -> RunArgs {
        RunArgs {
            trigger_id: "t1".to_string(),
            scope: ScopeArgs::default(),
            branch: None,
            subs: subs.iter().map(|s| s.to_string()).collect(),
            dry_run: true,
            wait: false,
        }
    }

    #[test]
    fn flags_override_stored_substitutions() {
        let mut state = State {
            selected_project: Some("p1".to_string()),
            ..State::default()
        };
        state.set_substitution("t1", "_ENV", "staging").unwrap();
        state.set_substitution("t1", "_TAG", "v1").unwrap();

        let invocation = plan(&state, &Defaults::default(), &args(&["_ENV=prod", "_NEW=a=b"])).unwrap();

        assert_eq!(invocation.project_id, "p1");
        assert_eq!(invocation.region, "global");
        assert_eq!(invocation.branch, "main");
        assert_eq!(invocation.substitutions.get("_ENV"), Some(&ScalarValue::from("prod")));
        assert_eq!(invocation.substitutions.get("_TAG"), Some(&ScalarValue::from("v1")));
        assert_eq!(invocation.substitutions.get("_NEW"), Some(&ScalarValue::from("a=b")));

        assert_eq!(
            invocation.to_command(IdentifierQuoting::Harden),
            "gcloud builds triggers run t1 --project=p1 --format=json --branch=main --substitutions='_ENV=prod,_TAG=v1,_NEW='\"'\"'a=b'\"'\"''"
        );
    }

    #[test]
    fn missing_project_is_an_error() {
        let err = plan(&State::default(), &Defaults::default(), &args(&[])).unwrap_err();
        assert_eq!(err.code, triggerdeck::ErrorCode::ProjectNoActive);
    }

    #[test]
    fn malformed_sub_flag_is_rejected() {
        let state = State {
            selected_project: Some("p1".to_string()),
            ..State::default()
        };
        assert!(plan(&state, &Defaults::default(), &args(&["NOEQUALS"])).is_err());
    }
}
