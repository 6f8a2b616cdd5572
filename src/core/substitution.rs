//! Substitution variables passed to a build trigger.
//!
//! Values arrive from JSON (state file, gcloud output) and may be strings,
//! numbers, booleans or null. They are kept as [`ScalarValue`] until the
//! moment they are rendered into a command line.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};
use crate::utils::shell;

/// A JSON scalar used as a substitution value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl ScalarValue {
    /// String form used on the command line, or `None` for null.
    pub fn coerce(&self) -> Option<String> {
        match self {
            ScalarValue::Null => None,
            ScalarValue::Bool(b) => Some(b.to_string()),
            ScalarValue::Number(n) => Some(n.to_string()),
            ScalarValue::String(s) => Some(s.clone()),
        }
    }

    /// Shell-safe token for this value.
    pub fn escape(&self) -> String {
        match self {
            ScalarValue::String(s) => shell::escape_str(s),
            other => shell::escape(other.coerce().as_deref()),
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(value: &str) -> Self {
        ScalarValue::String(value.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(value: String) -> Self {
        ScalarValue::String(value)
    }
}

impl From<bool> for ScalarValue {
    fn from(value: bool) -> Self {
        ScalarValue::Bool(value)
    }
}

impl From<i64> for ScalarValue {
    fn from(value: i64) -> Self {
        ScalarValue::Number(value.into())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.coerce() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

/// Ordered key → value mapping. Order of insertion is the order the pairs
/// appear in the rendered `--substitutions` flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubstitutionMap {
    entries: Vec<(String, ScalarValue)>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert or replace. An existing key keeps its position.
    /// Returns the previous value, if any.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ScalarValue>,
    ) -> Option<ScalarValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter().position(|(k, _)| *k == key) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<ScalarValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply every entry of `other` on top of `self`.
    pub fn overlay(&mut self, other: &SubstitutionMap) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }

    /// `KEY=<escaped value>` pairs joined by commas.
    pub fn render_pairs(&self) -> String {
        self.entries
            .iter()
            .map(|(key, value)| format!("{}={}", key, value.escape()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<K: Into<String>, V: Into<ScalarValue>> FromIterator<(K, V)> for SubstitutionMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SubstitutionMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl Serialize for SubstitutionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SubstitutionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SubstitutionMapVisitor;

        impl<'de> Visitor<'de> for SubstitutionMapVisitor {
            type Value = SubstitutionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of substitution key/value pairs")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut map = SubstitutionMap::new();
                while let Some((key, value)) = access.next_entry::<String, ScalarValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }

            fn visit_unit<E: de::Error>(self) -> std::result::Result<Self::Value, E> {
                Ok(SubstitutionMap::new())
            }
        }

        deserializer.deserialize_any(SubstitutionMapVisitor)
    }
}

/// Where a substitution value shown for a trigger comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstitutionOrigin {
    /// Declared on the trigger and not overridden.
    Default,
    /// Declared on the trigger and overridden locally.
    Modified,
    /// Only present as a local override.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubstitutionEntry {
    pub key: String,
    pub value: ScalarValue,
    pub origin: SubstitutionOrigin,
}

/// Merge a trigger's declared substitutions with local overrides.
///
/// Declared keys come first in their declared order, followed by
/// override-only keys in insertion order.
pub fn annotate(declared: &SubstitutionMap, overrides: &SubstitutionMap) -> Vec<SubstitutionEntry> {
    let mut merged = declared.clone();
    merged.overlay(overrides);

    merged
        .iter()
        .map(|(key, value)| {
            let origin = match (declared.contains_key(key), overrides.contains_key(key)) {
                (true, false) => SubstitutionOrigin::Default,
                (true, true) => SubstitutionOrigin::Modified,
                _ => SubstitutionOrigin::Custom,
            };
            SubstitutionEntry {
                key: key.to_string(),
                value: value.clone(),
                origin,
            }
        })
        .collect()
}

/// Validate a substitution key: non-empty and free of `=`.
pub fn validate_key(key: &str) -> Result<&str> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_invalid_argument(
            "key",
            "Substitution key cannot be empty",
            None,
            None,
        ));
    }
    if trimmed.contains('=') {
        return Err(Error::validation_invalid_argument(
            "key",
            "Substitution key cannot contain '='",
            Some(trimmed.to_string()),
            None,
        ));
    }
    Ok(trimmed)
}

/// Parse a `KEY=VALUE` flag. The value may itself contain `=`.
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        Error::validation_invalid_argument(
            "sub",
            format!("Expected KEY=VALUE, got '{}'", raw),
            None,
            None,
        )
    })?;
    let key = validate_key(key)?;
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_coerce_like_json() {
        assert_eq!(ScalarValue::from(0_i64).escape(), "0");
        assert_eq!(ScalarValue::from(123_i64).escape(), "123");
        assert_eq!(ScalarValue::from(true).escape(), "true");
        assert_eq!(ScalarValue::from(false).escape(), "false");
        assert_eq!(ScalarValue::Null.escape(), "\"\"");
        assert_eq!(ScalarValue::from("").escape(), "''");
    }

    #[test]
    fn deserializes_untagged_scalars() {
        let map: SubstitutionMap =
            serde_json::from_str(r#"{"A": "x", "B": 2, "C": true, "D": null, "E": 1.5}"#).unwrap();
        assert_eq!(map.get("A"), Some(&ScalarValue::from("x")));
        assert_eq!(map.get("B"), Some(&ScalarValue::from(2_i64)));
        assert_eq!(map.get("C"), Some(&ScalarValue::Bool(true)));
        assert_eq!(map.get("D"), Some(&ScalarValue::Null));
        assert_eq!(map.get("E").map(|v| v.escape()), Some("1.5".to_string()));
    }

    #[test]
    fn rejects_nested_values() {
        let result = serde_json::from_str::<SubstitutionMap>(r#"{"A": [1, 2]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn preserves_insertion_order() {
        let map: SubstitutionMap = serde_json::from_str(r#"{"Z": "1", "A": "2", "M": "3"}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Z", "A", "M"]);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"Z":"1","A":"2","M":"3"}"#);
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut map: SubstitutionMap = [("A", "1"), ("B", "2")].into_iter().collect();
        let previous = map.insert("A", "3");
        assert_eq!(previous, Some(ScalarValue::from("1")));
        assert_eq!(map.render_pairs(), "A=3,B=2");
    }

    #[test]
    fn remove_drops_entry() {
        let mut map: SubstitutionMap = [("A", "1"), ("B", "2")].into_iter().collect();
        assert!(map.remove("A").is_some());
        assert!(map.remove("A").is_none());
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn overlay_keeps_base_order_and_appends_new_keys() {
        let mut base: SubstitutionMap = [("A", "1"), ("B", "2")].into_iter().collect();
        let extra: SubstitutionMap = [("C", "3"), ("A", "9")].into_iter().collect();
        base.overlay(&extra);
        assert_eq!(base.render_pairs(), "A=9,B=2,C=3");
    }

    #[test]
    fn render_pairs_escapes_each_value() {
        let map: SubstitutionMap = [("A", "x"), ("B", "hello world")].into_iter().collect();
        assert_eq!(map.render_pairs(), "A=x,B='hello world'");
    }

    #[test]
    fn annotate_marks_origins() {
        let declared: SubstitutionMap = [("_ENV", "staging"), ("_REGION", "eu")].into_iter().collect();
        let overrides: SubstitutionMap = [("_TOKEN", "s3cr3t"), ("_ENV", "prod")].into_iter().collect();

        let entries = annotate(&declared, &overrides);

        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.key.as_str(), e.value.to_string(), e.origin))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("_ENV", "prod".to_string(), SubstitutionOrigin::Modified),
                ("_REGION", "eu".to_string(), SubstitutionOrigin::Default),
                ("_TOKEN", "s3cr3t".to_string(), SubstitutionOrigin::Custom),
            ]
        );
    }

    #[test]
    fn validate_key_rejects_empty_and_equals() {
        assert!(validate_key("").is_err());
        assert!(validate_key("   ").is_err());
        assert!(validate_key("A=B").is_err());
        assert_eq!(validate_key(" _ENV ").unwrap(), "_ENV");
    }

    #[test]
    fn parse_assignment_splits_on_first_equals() {
        let (key, value) = parse_assignment("_TOKEN=a=b=c").unwrap();
        assert_eq!(key, "_TOKEN");
        assert_eq!(value, "a=b=c");
        assert!(parse_assignment("NOVALUE").is_err());
        assert_eq!(parse_assignment("EMPTY=").unwrap().1, "");
    }
}
