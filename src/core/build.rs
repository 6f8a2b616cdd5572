//! Build status tracking and polling.

use std::time::Duration;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use crate::error::{BuildWaitDetails, Error, Result};
use crate::gcloud::{CommandRunner, GcloudClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    StatusUnknown,
    Pending,
    Queued,
    Working,
    Success,
    Failure,
    InternalError,
    Timeout,
    Cancelled,
    Expired,
}

impl BuildStatus {
    pub fn parse(raw: &str) -> Self {
        serde_json::from_value(serde_json::Value::String(raw.to_string()))
            .unwrap_or(BuildStatus::StatusUnknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildStatus::StatusUnknown => "STATUS_UNKNOWN",
            BuildStatus::Pending => "PENDING",
            BuildStatus::Queued => "QUEUED",
            BuildStatus::Working => "WORKING",
            BuildStatus::Success => "SUCCESS",
            BuildStatus::Failure => "FAILURE",
            BuildStatus::InternalError => "INTERNAL_ERROR",
            BuildStatus::Timeout => "TIMEOUT",
            BuildStatus::Cancelled => "CANCELLED",
            BuildStatus::Expired => "EXPIRED",
        }
    }

    /// Whether the build has stopped and will not change status again.
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            BuildStatus::StatusUnknown
                | BuildStatus::Pending
                | BuildStatus::Queued
                | BuildStatus::Working
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RawBuild {
    #[serde(default)]
    id: String,
    status: Option<String>,
    log_url: Option<String>,
    create_time: Option<String>,
    start_time: Option<String>,
    finish_time: Option<String>,
}

/// Summary of a build as reported by `gcloud builds describe/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawBuild")]
pub struct BuildSummary {
    pub id: String,
    pub status: BuildStatus,
    pub log_url: Option<String>,
    pub create_time: Option<String>,
    pub finish_time: Option<String>,
    pub duration_secs: Option<i64>,
}

impl From<RawBuild> for BuildSummary {
    fn from(raw: RawBuild) -> Self {
        let duration_secs = match (&raw.start_time, &raw.finish_time) {
            (Some(start), Some(finish)) => duration_between(start, finish),
            _ => None,
        };

        BuildSummary {
            id: raw.id,
            status: raw
                .status
                .as_deref()
                .map(BuildStatus::parse)
                .unwrap_or(BuildStatus::StatusUnknown),
            log_url: raw.log_url,
            create_time: raw.create_time,
            finish_time: raw.finish_time,
            duration_secs,
        }
    }
}

fn duration_between(start: &str, finish: &str) -> Option<i64> {
    let start = DateTime::parse_from_rfc3339(start).ok()?;
    let finish = DateTime::parse_from_rfc3339(finish).ok()?;
    Some((finish - start).num_seconds())
}

/// Polling schedule for [`wait_for_build`].
#[derive(Debug, Clone, Copy)]
pub struct WaitOptions {
    pub interval: Duration,
    pub timeout: Duration,
}

impl WaitOptions {
    /// Number of status checks allowed before giving up. Always at least one.
    pub fn max_polls(&self) -> u32 {
        if self.interval.is_zero() {
            return 1;
        }
        let polls = self.timeout.as_millis() / self.interval.as_millis().max(1);
        polls.clamp(1, u32::MAX as u128) as u32
    }
}

/// Poll a build until it reaches a terminal status.
///
/// `sleep` is called between polls, never after the last one.
pub fn wait_for_build<R, S>(
    client: &GcloudClient<R>,
    project_id: &str,
    region: &str,
    build_id: &str,
    options: WaitOptions,
    mut sleep: S,
) -> Result<BuildSummary>
where
    R: CommandRunner,
    S: FnMut(Duration),
{
    let max_polls = options.max_polls();
    let mut last_status = BuildStatus::StatusUnknown;

    for poll in 1..=max_polls {
        let summary = client.describe_build(project_id, region, build_id)?;

        if summary.status != last_status {
            crate::log_status!("build", "{} is {}", build_id, summary.status.as_str());
            last_status = summary.status;
        }

        if summary.status.is_terminal() {
            return Ok(summary);
        }

        if poll < max_polls {
            sleep(options.interval);
        }
    }

    Err(Error::build_wait_timeout(BuildWaitDetails {
        build_id: build_id.to_string(),
        last_status: last_status.as_str().to_string(),
        polls: max_polls,
    }))
}
