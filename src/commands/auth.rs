use clap::Args;
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::gcloud::AuthStatus;

use super::CmdResult;

#[derive(Args)]
pub struct AuthArgs {}

#[derive(Debug, Serialize)]
pub struct AuthOutput {
    command: String,
    #[serde(flatten)]
    status: AuthStatus,
}

/// Reports the active gcloud account. A gcloud failure is part of the
/// output (`authenticated: false`), not an error, but exits 1.
pub fn run(_args: AuthArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<AuthOutput> {
    let config = defaults::load_config();
    let status = super::client(&config).auth_status();
    let exit_code = if status.authenticated { 0 } else { 1 };

    Ok((
        AuthOutput {
            command: "auth.status".to_string(),
            status,
        },
        exit_code,
    ))
}
