//! gcloud client.
//!
//! Builds commands through [`crate::invocation`], hands them to a
//! [`CommandRunner`] and decodes the JSON gcloud prints with `--format=json`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::build::BuildSummary;
use crate::error::{Error, GcloudCommandFailedDetails, Result};
use crate::invocation::{self, BuildInvocation, IdentifierQuoting};
use crate::substitution::SubstitutionMap;
use crate::utils::command::{self, CommandOutput};

/// Executes a full command line through a shell.
pub trait CommandRunner {
    fn run(&self, command: &str) -> CommandOutput;
}

/// Runs commands with `sh -c` (or `cmd /C` on Windows).
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> CommandOutput {
        command::run_shell(command)
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &str) -> CommandOutput {
        (**self).run(command)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    pub account: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub project_number: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub id: String,
    pub name: String,
    pub description: String,
    pub github_repo: Option<String>,
    pub branch: Option<String>,
    pub disabled: bool,
    pub region: String,
    pub substitutions: SubstitutionMap,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerRunResult {
    pub build_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_url: Option<String>,
}

#[derive(Deserialize)]
struct RawAccount {
    account: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProject {
    project_id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    project_number: String,
}

#[derive(Deserialize, Default)]
struct RawPush {
    branch: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawGithub {
    name: Option<String>,
    push: Option<RawPush>,
}

#[derive(Deserialize)]
struct RawTrigger {
    id: String,
    #[serde(default)]
    name: String,
    description: Option<String>,
    github: Option<RawGithub>,
    disabled: Option<bool>,
    #[serde(default)]
    substitutions: SubstitutionMap,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawOperationBuild {
    id: Option<String>,
    log_url: Option<String>,
}

#[derive(Deserialize, Default)]
struct RawOperationMetadata {
    build: Option<RawOperationBuild>,
}

#[derive(Deserialize)]
struct RawOperation {
    name: Option<String>,
    metadata: Option<RawOperationMetadata>,
}

impl RawOperation {
    /// Build id from `metadata.build.id`, else the last `/` segment of `name`.
    fn into_result(self) -> TriggerRunResult {
        let build = self.metadata.and_then(|m| m.build).unwrap_or_default();
        let build_id = build
            .id
            .filter(|id| !id.is_empty())
            .or_else(|| {
                self.name
                    .as_deref()
                    .and_then(|n| n.rsplit('/').next())
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "unknown".to_string());

        TriggerRunResult {
            build_id,
            log_url: build.log_url,
        }
    }
}

pub struct GcloudClient<R: CommandRunner = ShellRunner> {
    runner: R,
    quoting: IdentifierQuoting,
}

impl GcloudClient<ShellRunner> {
    pub fn shell(quoting: IdentifierQuoting) -> Self {
        Self::new(ShellRunner, quoting)
    }
}

impl<R: CommandRunner> GcloudClient<R> {
    pub fn new(runner: R, quoting: IdentifierQuoting) -> Self {
        Self { runner, quoting }
    }

    pub fn quoting(&self) -> IdentifierQuoting {
        self.quoting
    }

    fn exec(&self, operation: &str, command: &str) -> Result<CommandOutput> {
        let output = self.runner.run(command);
        if !output.success {
            return Err(Error::gcloud_command_failed(GcloudCommandFailedDetails {
                operation: operation.to_string(),
                command: command.to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }));
        }
        Ok(output)
    }

    fn exec_json<T: DeserializeOwned>(&self, operation: &str, command: &str) -> Result<T> {
        let output = self.exec(operation, command)?;
        serde_json::from_str(&output.stdout)
            .map_err(|e| Error::gcloud_invalid_output(operation, e, &output.stdout))
    }

    /// Active account, if any. Command failures are reported in the
    /// returned status rather than as an error.
    pub fn auth_status(&self) -> AuthStatus {
        let output = self.runner.run(&invocation::auth_list_command());
        if !output.success {
            return AuthStatus {
                authenticated: false,
                account: None,
                error: Some(output.error_text()),
            };
        }

        match serde_json::from_str::<Vec<RawAccount>>(&output.stdout) {
            Ok(accounts) => {
                let account = accounts.into_iter().next().map(|a| a.account);
                AuthStatus {
                    authenticated: account.is_some(),
                    account,
                    error: None,
                }
            }
            Err(e) => AuthStatus {
                authenticated: false,
                account: None,
                error: Some(format!("Unreadable gcloud output: {}", e)),
            },
        }
    }

    pub fn list_projects(&self) -> Result<Vec<Project>> {
        let raw: Vec<RawProject> =
            self.exec_json("list projects", &invocation::projects_list_command())?;

        Ok(raw
            .into_iter()
            .map(|p| Project {
                id: p.project_id,
                name: p.name,
                project_number: p.project_number,
            })
            .collect())
    }

    pub fn list_triggers(&self, project_id: &str, region: &str) -> Result<Vec<Trigger>> {
        let command = invocation::triggers_list_command(project_id, region, self.quoting);
        let raw: Vec<RawTrigger> = self.exec_json("list triggers", &command)?;

        Ok(raw
            .into_iter()
            .map(|t| {
                let github = t.github.unwrap_or_default();
                Trigger {
                    id: t.id,
                    name: t.name,
                    description: t.description.unwrap_or_default(),
                    github_repo: github.name,
                    branch: github.push.and_then(|p| p.branch),
                    disabled: t.disabled.unwrap_or(false),
                    region: region.to_string(),
                    substitutions: t.substitutions,
                }
            })
            .collect())
    }

    /// Look up a trigger by id, falling back to name.
    pub fn find_trigger(&self, project_id: &str, region: &str, id_or_name: &str) -> Result<Trigger> {
        let triggers = self.list_triggers(project_id, region)?;
        let (by_id, rest): (Vec<_>, Vec<_>) =
            triggers.into_iter().partition(|t| t.id == id_or_name);

        by_id
            .into_iter()
            .chain(rest.into_iter().filter(|t| t.name == id_or_name))
            .next()
            .ok_or_else(|| Error::trigger_not_found(id_or_name))
    }

    pub fn run_trigger(&self, request: &BuildInvocation) -> Result<TriggerRunResult> {
        crate::log_status!(
            "run",
            "Trigger {} in {} (region {}, branch {}, {} substitution(s))",
            request.trigger_id,
            request.project_id,
            if request.region.is_empty() {
                invocation::GLOBAL_REGION
            } else {
                request.region.as_str()
            },
            if request.branch.is_empty() {
                "-"
            } else {
                request.branch.as_str()
            },
            request.substitutions.len()
        );

        let command = request.to_command(self.quoting);
        let operation: RawOperation = self.exec_json("run trigger", &command)?;
        Ok(operation.into_result())
    }

    pub fn describe_build(
        &self,
        project_id: &str,
        region: &str,
        build_id: &str,
    ) -> Result<BuildSummary> {
        let command =
            invocation::build_describe_command(build_id, project_id, region, self.quoting);
        self.exec_json("describe build", &command)
    }

    pub fn list_builds(&self, project_id: &str, region: &str, limit: u32) -> Result<Vec<BuildSummary>> {
        let command = invocation::builds_list_command(project_id, region, limit, self.quoting);
        self.exec_json("list builds", &command)
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;

    /// Replays canned outputs in order and records every command it was given.
    #[derive(Default)]
    pub struct ScriptedRunner {
        pub responses: RefCell<VecDeque<CommandOutput>>,
        pub commands: RefCell<Vec<String>>,
    }

    impl ScriptedRunner {
        pub fn with(responses: Vec<CommandOutput>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                commands: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for ScriptedRunner {
        fn run(&self, command: &str) -> CommandOutput {
            self.commands.borrow_mut().push(command.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| CommandOutput::failed(1, "no scripted response"))
        }
    }
}
