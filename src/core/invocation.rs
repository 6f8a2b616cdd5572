//! gcloud command-line assembly.
//!
//! Every command handed to the shell is built here. Substitution values are
//! always escaped; identifier fields (trigger, project, region, branch,
//! build id) follow [`IdentifierQuoting`].

use serde::{Deserialize, Serialize};

use crate::substitution::SubstitutionMap;
use crate::utils::shell;

pub const GCLOUD: &str = "gcloud";

/// Region value meaning "no --region flag".
pub const GLOBAL_REGION: &str = "global";

/// How identifier fields are rendered into commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierQuoting {
    /// Pass identifiers through the escaper like any other value.
    #[default]
    Harden,
    /// Interpolate identifiers verbatim.
    Preserve,
}

impl IdentifierQuoting {
    pub fn render(self, value: &str) -> String {
        match self {
            IdentifierQuoting::Harden => shell::escape_str(value),
            IdentifierQuoting::Preserve => value.to_string(),
        }
    }
}

/// A request to run one build trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInvocation {
    pub trigger_id: String,
    pub project_id: String,
    pub region: String,
    pub branch: String,
    pub substitutions: SubstitutionMap,
}

impl BuildInvocation {
    /// Full `gcloud builds triggers run` command line.
    ///
    /// The substitutions blob is escaped twice: each value inside the
    /// `KEY=VALUE,...` list, then the list as a whole, because gcloud parses
    /// the flag value again after the shell has removed the outer quotes.
    pub fn to_command(&self, quoting: IdentifierQuoting) -> String {
        let mut command = format!(
            "{} builds triggers run {} --project={} --format=json",
            GCLOUD,
            quoting.render(&self.trigger_id),
            quoting.render(&self.project_id),
        );

        push_region_flag(&mut command, &self.region, quoting);

        if !self.branch.is_empty() {
            command.push_str(" --branch=");
            command.push_str(&quoting.render(&self.branch));
        }

        if !self.substitutions.is_empty() {
            command.push_str(" --substitutions=");
            command.push_str(&shell::escape_str(&self.substitutions.render_pairs()));
        }

        command
    }
}

/// True when `region` should produce a `--region` flag.
pub fn is_regional(region: &str) -> bool {
    !region.is_empty() && region != GLOBAL_REGION
}

fn push_region_flag(command: &mut String, region: &str, quoting: IdentifierQuoting) {
    if is_regional(region) {
        command.push_str(" --region=");
        command.push_str(&quoting.render(region));
    }
}

pub fn auth_list_command() -> String {
    format!("{} auth list --filter=status:ACTIVE --format=json", GCLOUD)
}

pub fn projects_list_command() -> String {
    format!("{} projects list --format=json", GCLOUD)
}

pub fn triggers_list_command(project_id: &str, region: &str, quoting: IdentifierQuoting) -> String {
    let mut command = format!(
        "{} builds triggers list --project={} --format=json",
        GCLOUD,
        quoting.render(project_id)
    );
    push_region_flag(&mut command, region, quoting);
    command
}

pub fn build_describe_command(
    build_id: &str,
    project_id: &str,
    region: &str,
    quoting: IdentifierQuoting,
) -> String {
    let mut command = format!(
        "{} builds describe {} --project={} --format=json",
        GCLOUD,
        quoting.render(build_id),
        quoting.render(project_id)
    );
    push_region_flag(&mut command, region, quoting);
    command
}

pub fn builds_list_command(
    project_id: &str,
    region: &str,
    limit: u32,
    quoting: IdentifierQuoting,
) -> String {
    let mut command = format!(
        "{} builds list --project={} --limit={} --format=json",
        GCLOUD,
        quoting.render(project_id),
        limit
    );
    push_region_flag(&mut command, region, quoting);
    command
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(region: &str, branch: &str, subs: &[(&str, &str)]) -> BuildInvocation {
        BuildInvocation {
            trigger_id: "t1".to_string(),
            project_id: "p1".to_string(),
            region: region.to_string(),
            branch: branch.to_string(),
            substitutions: subs.iter().copied().collect(),
        }
    }

    #[test]
    fn global_region_omits_flag_and_double_escapes_substitutions() {
        let inv = invocation("global", "main", &[("A", "x"), ("B", "hello world")]);
        let expected = format!(
            "gcloud builds triggers run t1 --project=p1 --format=json --branch=main --substitutions={}",
            shell::escape_str("A=x,B='hello world'")
        );
        assert_eq!(inv.to_command(IdentifierQuoting::Harden), expected);
        assert_eq!(inv.to_command(IdentifierQuoting::Preserve), expected);
        assert_eq!(
            expected,
            "gcloud builds triggers run t1 --project=p1 --format=json --branch=main \
             --substitutions='A=x,B='\"'\"'hello world'\"'\"''"
        );
    }

    #[test]
    fn regional_invocation_orders_flags() {
        let inv = invocation("us-central1", "develop", &[]);
        assert_eq!(
            inv.to_command(IdentifierQuoting::Harden),
            "gcloud builds triggers run t1 --project=p1 --format=json --region=us-central1 --branch=develop"
        );
    }

    #[test]
    fn empty_region_and_branch_omit_flags() {
        let inv = invocation("", "", &[]);
        assert_eq!(
            inv.to_command(IdentifierQuoting::Harden),
            "gcloud builds triggers run t1 --project=p1 --format=json"
        );
    }

    #[test]
    fn empty_substitutions_omit_flag() {
        let inv = invocation("global", "main", &[]);
        assert!(!inv.to_command(IdentifierQuoting::Harden).contains("--substitutions"));
    }

    #[test]
    fn simple_only_substitutions_still_pass_outer_escape() {
        let inv = invocation("global", "", &[("A", "x"), ("B", "y")]);
        // the comma and '=' make the blob non-simple
        assert!(inv
            .to_command(IdentifierQuoting::Harden)
            .ends_with("--substitutions='A=x,B=y'"));
    }

    #[test]
    fn harden_quotes_free_text_branch() {
        let inv = invocation("global", "main; touch /tmp/pwned", &[]);
        assert!(inv
            .to_command(IdentifierQuoting::Harden)
            .ends_with("--branch='main; touch /tmp/pwned'"));
        assert!(inv
            .to_command(IdentifierQuoting::Preserve)
            .ends_with("--branch=main; touch /tmp/pwned"));
    }

    #[test]
    fn listing_commands() {
        let q = IdentifierQuoting::Harden;
        assert_eq!(
            triggers_list_command("p1", "global", q),
            "gcloud builds triggers list --project=p1 --format=json"
        );
        assert_eq!(
            triggers_list_command("p1", "europe-west1", q),
            "gcloud builds triggers list --project=p1 --format=json --region=europe-west1"
        );
        assert_eq!(
            builds_list_command("p1", "global", 10, q),
            "gcloud builds list --project=p1 --limit=10 --format=json"
        );
        assert_eq!(
            build_describe_command("abc-123", "p1", "us-east1", q),
            "gcloud builds describe abc-123 --project=p1 --format=json --region=us-east1"
        );
    }

    #[test]
    fn quoting_policy_deserializes_lowercase() {
        let q: IdentifierQuoting = serde_json::from_str("\"preserve\"").unwrap();
        assert_eq!(q, IdentifierQuoting::Preserve);
        assert_eq!(IdentifierQuoting::default(), IdentifierQuoting::Harden);
    }
}
