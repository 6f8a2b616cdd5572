use clap::{Args, Subcommand};
use serde::Serialize;

use triggerdeck::defaults;
use triggerdeck::state;
use triggerdeck::substitution::{self, ScalarValue, SubstitutionEntry, SubstitutionMap};

use super::{CmdResult, ScopeArgs};

#[derive(Args)]
pub struct SubsArgs {
    #[command(subcommand)]
    command: SubsCommand,
}

#[derive(Subcommand)]
enum SubsCommand {
    /// Show stored substitution overrides for a trigger
    List {
        /// Trigger ID
        trigger_id: String,
        /// Merge with the trigger's declared substitutions and mark each key
        /// as default, modified or custom (queries gcloud)
        #[arg(long)]
        with_defaults: bool,
        #[command(flatten)]
        scope: ScopeArgs,
    },
    /// Store an override
    Set {
        /// Trigger ID
        trigger_id: String,
        /// Substitution key (e.g. _DEPLOY_ENV)
        key: String,
        /// Value, stored as a string unless --json is given
        value: String,
        /// Parse the value as a JSON scalar (number, boolean, null, string)
        #[arg(long)]
        json: bool,
    },
    /// Remove an override
    Remove {
        /// Trigger ID
        trigger_id: String,
        /// Substitution key
        key: String,
    },
    /// Remove every override for a trigger
    Clear {
        /// Trigger ID
        trigger_id: String,
    },
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsOutput {
    command: String,
    trigger_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    substitutions: Option<SubstitutionMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<SubstitutionEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    previous: Option<ScalarValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    removed: Option<usize>,
}

pub fn run(args: SubsArgs, _global: &crate::commands::GlobalArgs) -> CmdResult<SubsOutput> {
    match args.command {
        SubsCommand::List {
            trigger_id,
            with_defaults,
            scope,
        } => list(trigger_id, with_defaults, &scope),
        SubsCommand::Set {
            trigger_id,
            key,
            value,
            json,
        } => set(trigger_id, &key, &value, json),
        SubsCommand::Remove { trigger_id, key } => remove(trigger_id, &key),
        SubsCommand::Clear { trigger_id } => clear(trigger_id),
    }
}

fn list(trigger_id: String, with_defaults: bool, scope: &ScopeArgs) -> CmdResult<SubsOutput> {
    let state = state::load_state()?;
    let overrides = state.substitutions_for(&trigger_id);

    if !with_defaults {
        return Ok((
            SubsOutput {
                command: "subs.list".to_string(),
                trigger_id,
                substitutions: Some(overrides),
                ..SubsOutput::default()
            },
            0,
        ));
    }

    let config = defaults::load_config();
    let project_id = state.resolve_project(scope.project())?;
    let region = state.resolve_region(scope.region(), &config.defaults);
    let trigger = super::client(&config).find_trigger(&project_id, &region, &trigger_id)?;

    Ok((
        SubsOutput {
            command: "subs.list".to_string(),
            trigger_id,
            entries: Some(substitution::annotate(&trigger.substitutions, &overrides)),
            ..SubsOutput::default()
        },
        0,
    ))
}

fn set(trigger_id: String, key: &str, raw: &str, json: bool) -> CmdResult<SubsOutput> {
    let value = parse_value(raw, json)?;

    let mut state = state::load_state()?;
    let previous = state.set_substitution(&trigger_id, key, value.clone())?;
    state::save_state(&state)?;

    Ok((
        SubsOutput {
            command: "subs.set".to_string(),
            trigger_id,
            key: Some(key.trim().to_string()),
            value: Some(value),
            previous,
            ..SubsOutput::default()
        },
        0,
    ))
}

fn remove(trigger_id: String, key: &str) -> CmdResult<SubsOutput> {
    let mut state = state::load_state()?;
    let previous = state.remove_substitution(&trigger_id, key)?;
    state::save_state(&state)?;

    Ok((
        SubsOutput {
            command: "subs.remove".to_string(),
            trigger_id,
            key: Some(key.to_string()),
            previous: Some(previous),
            removed: Some(1),
            ..SubsOutput::default()
        },
        0,
    ))
}

fn clear(trigger_id: String) -> CmdResult<SubsOutput> {
    let mut state = state::load_state()?;
    let removed = state.clear_substitutions(&trigger_id);
    if removed > 0 {
        state::save_state(&state)?;
    }

    Ok((
        SubsOutput {
            command: "subs.clear".to_string(),
            trigger_id,
            removed: Some(removed),
            ..SubsOutput::default()
        },
        0,
    ))
}

/// Values are strings unless `--json` asks for a scalar literal.
fn parse_value(raw: &str, json: bool) -> triggerdeck::Result<ScalarValue> {
    if !json {
        return Ok(ScalarValue::from(raw));
    }

    let value = super::parse_json_arg(raw, "parse substitution value")?;
    serde_json::from_value(value).map_err(|_| {
        triggerdeck::Error::validation_invalid_argument(
            "value",
            "Substitution values must be a string, number, boolean or null",
            Some(raw.to_string()),
            None,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_values_stay_strings() {
        assert_eq!(parse_value("123", false).unwrap(), ScalarValue::from("123"));
        assert_eq!(parse_value("it's", false).unwrap(), ScalarValue::from("it's"));
    }

    #[test]
    fn json_values_become_scalars() {
        assert_eq!(parse_value("123", true).unwrap(), ScalarValue::from(123_i64));
        assert_eq!(parse_value("true", true).unwrap(), ScalarValue::from(true));
        assert_eq!(parse_value("null", true).unwrap(), ScalarValue::Null);
        assert_eq!(parse_value("\"x y\"", true).unwrap(), ScalarValue::from("x y"));
    }

    #[test]
    fn json_objects_are_rejected() {
        assert!(parse_value("{\"a\":1}", true).is_err());
        assert!(parse_value("[1]", true).is_err());
        assert!(parse_value("not json", true).is_err());
    }
}
