//! Shell escaping and quoting utilities.
//!
//! Every token produced here is meant to be embedded as one word in a
//! command line that is later run through `sh -c`. POSIX single quotes
//! suppress every special character except the single quote itself, so the
//! only transformation needed inside the quotes is for `'`.

use regex::Regex;
use std::sync::LazyLock;

/// Characters that never need quoting. Requires at least one character, so
/// the empty string always takes the quoted path.
static SIMPLE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("simple token pattern is valid"));

/// Token emitted for an absent value: an already-quoted empty argument.
pub const ABSENT_TOKEN: &str = "\"\"";

/// Replacement for a literal `'` inside a single-quoted segment:
/// close the quote, emit `'` inside double quotes, reopen the quote.
const QUOTE_BREAKOUT: &str = "'\"'\"'";

/// Returns true when `value` can be placed on a command line unquoted.
pub fn is_simple(value: &str) -> bool {
    SIMPLE_TOKEN.is_match(value)
}

/// Escape an optional value. `None` becomes [`ABSENT_TOKEN`].
pub fn escape(value: Option<&str>) -> String {
    match value {
        Some(value) => escape_str(value),
        None => ABSENT_TOKEN.to_string(),
    }
}

/// Escape a string into a single shell word.
///
/// Simple values are returned unchanged; anything else is wrapped in single
/// quotes with embedded `'` rewritten as `'"'"'`.
pub fn escape_str(value: &str) -> String {
    if is_simple(value) {
        return value.to_string();
    }

    quote(value)
}

/// Always single-quote `value`, even if it is simple.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for segment in value.split_inclusive('\'') {
        match segment.strip_suffix('\'') {
            Some(head) => {
                quoted.push_str(head);
                quoted.push_str(QUOTE_BREAKOUT);
            }
            None => quoted.push_str(segment),
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_values_pass_through() {
        for value in ["t1", "main", "us-central1", "v1.2.3", "_ENV", "a-b_c.d", "0", "-1"] {
            assert_eq!(escape_str(value), value);
        }
    }

    #[test]
    fn absent_value_is_double_quoted_empty() {
        assert_eq!(escape(None), "\"\"");
    }

    #[test]
    fn empty_string_is_single_quoted_empty() {
        assert_eq!(escape_str(""), "''");
        assert_eq!(escape(Some("")), "''");
    }

    #[test]
    fn whitespace_is_quoted() {
        assert_eq!(escape_str(" "), "' '");
        assert_eq!(escape_str("\n"), "'\n'");
        assert_eq!(escape_str("a\tb"), "'a\tb'");
    }

    #[test]
    fn single_quotes_break_out() {
        assert_eq!(escape_str("it's a test"), "'it'\"'\"'s a test'");
        assert_eq!(escape_str("a 'b' c"), "'a '\"'\"'b'\"'\"' c'");
        assert_eq!(escape_str("'"), "''\"'\"''");
    }

    #[test]
    fn metacharacters_stay_literal_inside_quotes() {
        assert_eq!(escape_str("$HOME"), "'$HOME'");
        assert_eq!(escape_str("`id`"), "'`id`'");
        assert_eq!(escape_str("a;b&&c"), "'a;b&&c'");
        assert_eq!(escape_str("say \"hi\""), "'say \"hi\"'");
    }

    #[test]
    fn multi_line_value_keeps_newlines() {
        let key = "-----BEGIN KEY-----\nabc+/=\n-----END KEY-----";
        let escaped = escape_str(key);
        assert_eq!(escaped, format!("'{}'", key));
    }

    #[test]
    fn quote_forces_quotes_on_simple_value() {
        assert_eq!(quote("main"), "'main'");
    }
}
