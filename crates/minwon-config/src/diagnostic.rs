// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config diagnostics for `minwon check` and startup.
//!
//! Parse failures from figment become [`ConfigError`]s that point at the
//! offending line of `minwon.toml` and name the `MINWON_*` variable that
//! overrides the same key. Rule violations found after parsing carry the
//! dotted key they concern.

#![allow(unused_assignments)] // emitted by the miette derive

use std::fmt;

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

use crate::loader::ENV_SECTIONS;

/// Below this Jaro-Winkler score a key is not offered as a correction.
const MIN_SIMILARITY: f64 = 0.75;

/// Relay settings whose values the relay itself depends on at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayRule {
    MaxConcurrentJobs,
    UrgentMarker,
    UrgentKeywords,
    OwnerNotifyUrl,
}

impl RelayRule {
    /// Key name under `[relay]`.
    pub fn key(self) -> &'static str {
        match self {
            Self::MaxConcurrentJobs => "max_concurrent_jobs",
            Self::UrgentMarker => "urgent_marker",
            Self::UrgentKeywords => "urgent_keywords",
            Self::OwnerNotifyUrl => "owner_notify_url",
        }
    }

    fn hint(self) -> &'static str {
        match self {
            Self::MaxConcurrentJobs => "callback jobs run under this many permits; use 1 or more",
            Self::UrgentMarker => "urgent replies start with this marker, e.g. \"[긴급]\"",
            Self::UrgentKeywords => "an empty keyword matches every complaint; remove it",
            Self::OwnerNotifyUrl => "owner alerts are POSTed as JSON; use an http(s) URL or drop the key",
        }
    }
}

impl fmt::Display for RelayRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "relay.{}", self.key())
    }
}

/// A problem with the loaded configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A key no section accepts, usually a typo.
    #[error("unknown key `{key}` in {}", table_label(.table.as_deref()))]
    #[diagnostic(
        code(minwon::config::unknown_key),
        help("{}", unknown_key_help(table.as_deref(), suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        table: Option<String>,
        key: String,
        suggestion: Option<String>,
        valid_keys: Vec<String>,
        #[label("not a minwon setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that does not deserialize into the field's type.
    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(code(minwon::config::wrong_type), help("expected {expected}"))]
    WrongType {
        key: String,
        found: String,
        expected: String,
        #[label("this key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A parsed value outside what the service accepts.
    #[error("`{key}` {reason}")]
    #[diagnostic(code(minwon::config::invalid), help("{}", override_help(key)))]
    Invalid { key: String, reason: String },

    /// A `[relay]` setting that breaks complaint handling.
    #[error("`{rule}` {detail}")]
    #[diagnostic(code(minwon::config::relay), help("{}", rule.hint()))]
    Relay { rule: RelayRule, detail: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(minwon::config::other))]
    Other(String),
}

impl ConfigError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn relay(rule: RelayRule, detail: impl Into<String>) -> Self {
        Self::Relay {
            rule,
            detail: detail.into(),
        }
    }
}

fn table_label(table: Option<&str>) -> String {
    match table {
        Some(t) => format!("[{t}]"),
        None => "the top level".to_string(),
    }
}

/// Environment variable that overrides `section.key`, if the loader maps one.
pub fn env_var_for(dotted_key: &str) -> Option<String> {
    let (section, key) = dotted_key.split_once('.')?;
    if !ENV_SECTIONS.contains(&section) || key.contains(['.', '[']) {
        return None;
    }
    Some(format!("MINWON_{section}_{key}").to_uppercase())
}

fn override_help(key: &str) -> String {
    match env_var_for(key) {
        Some(var) => format!("fix it in minwon.toml or override it with {var}"),
        None => "fix it in minwon.toml".to_string(),
    }
}

fn unknown_key_help(table: Option<&str>, suggestion: Option<&str>, valid_keys: &[String]) -> String {
    let mut help = match suggestion {
        Some(s) => format!("did you mean `{s}`?"),
        None => format!("[{}] accepts: {}", table.unwrap_or(""), valid_keys.join(", ")),
    };
    if let (Some(t), Some(s)) = (table, suggestion)
        && let Some(var) = env_var_for(&format!("{t}.{s}"))
    {
        help.push_str(&format!(" (env: {var})"));
    }
    help
}

/// Turn a figment extraction failure into one diagnostic per problem.
///
/// `sources` pairs each TOML file path (or `<inline>` for string input)
/// with its content so spans can be attached.
pub fn from_figment(err: figment::Error, sources: &[(String, String)]) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let path: Vec<String> = error.path.clone();
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let valid_keys: Vec<String> = expected.iter().map(|k| k.to_string()).collect();
                    let table = (!path.is_empty()).then(|| path.join("."));
                    let (span, src) = pin(&error, sources, table.as_deref(), field);
                    ConfigError::UnknownKey {
                        suggestion: closest_key(field, expected),
                        table,
                        key: field.clone(),
                        valid_keys,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(found, expected) => {
                    let (table, key) = match path.split_last() {
                        Some((last, rest)) if !rest.is_empty() => (Some(rest.join(".")), last.as_str()),
                        Some((last, _)) => (None, last.as_str()),
                        None => (None, ""),
                    };
                    let (span, src) = pin(&error, sources, table.as_deref(), key);
                    ConfigError::WrongType {
                        key: path.join("."),
                        found: found.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

/// The file figment blames for `error`, if it is one of `sources`.
fn blamed_source<'a>(
    error: &figment::Error,
    sources: &'a [(String, String)],
) -> Option<&'a (String, String)> {
    match error.metadata.as_ref()?.source.as_ref()? {
        figment::Source::File(path) => {
            let path = path.display().to_string();
            sources.iter().find(|(p, _)| *p == path)
        }
        figment::Source::Code(_) => sources.iter().find(|(p, _)| p == "<inline>"),
        _ => None,
    }
}

/// Find `key` in the blamed file first, then in any other loaded file.
fn pin(
    error: &figment::Error,
    sources: &[(String, String)],
    table: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    blamed_source(error, sources)
        .into_iter()
        .chain(sources.iter())
        .find_map(|(name, content)| {
            locate_key(content, table, key)
                .map(|span| (Some(span), Some(NamedSource::new(name, content.clone()))))
        })
        .unwrap_or((None, None))
}

/// Span of `key = ...` inside `[table]`, or before any header when `table` is `None`.
pub fn locate_key(content: &str, table: Option<&str>, key: &str) -> Option<SourceSpan> {
    let mut current: Option<&str> = None;
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            current = Some(trimmed.trim_matches(['[', ']']).trim());
        } else if current == table
            && let Some((lhs, _)) = trimmed.split_once('=')
            && lhs.trim() == key
        {
            let column = line.find(key)?;
            return Some(SourceSpan::new((offset + column).into(), key.len()));
        }
        offset += line.len();
    }
    None
}

/// Closest accepted key to `unknown`, if any is similar enough.
pub fn closest_key(unknown: &str, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .map(|c| (strsim::jaro_winkler(unknown, c), *c))
        .filter(|(score, _)| *score > MIN_SIMILARITY)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, c)| c.to_string())
}

/// Render diagnostics as miette reports, one after another.
pub fn render_to_string(errors: &[ConfigError]) -> String {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            out.push_str(&format!("error: {error}\n"));
        }
    }
    out
}

/// Print diagnostics to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    eprint!("{}", render_to_string(errors));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closest_key_fixes_transposed_letters() {
        let keys = ["history_turns", "paused_delay_secs", "urgent_marker"];
        assert_eq!(closest_key("histroy_turns", &keys).as_deref(), Some("history_turns"));
        assert_eq!(closest_key("zzzzzz", &keys), None);
    }

    #[test]
    fn env_var_follows_loader_mapping() {
        assert_eq!(
            env_var_for("relay.paused_delay_secs").as_deref(),
            Some("MINWON_RELAY_PAUSED_DELAY_SECS")
        );
        assert_eq!(env_var_for("telegram.bot_token"), None);
        assert_eq!(env_var_for("kakao.quick_replies[0]"), None);
        assert_eq!(env_var_for("port"), None);
    }

    #[test]
    fn locate_key_respects_table_boundaries() {
        let content = "port = 1\n[server]\nhost = \"a\"\n  port = 8000\n[relay]\nport = 3\n";
        let span = locate_key(content, Some("server"), "port").expect("found");
        assert_eq!(&content[span.offset()..span.offset() + span.len()], "port");
        assert_eq!(span.offset(), content.find("  port").map(|o| o + 2).unwrap_or_default());

        let top = locate_key(content, None, "port").expect("found");
        assert_eq!(top.offset(), 0);
        assert_eq!(locate_key(content, Some("storage"), "port"), None);
    }

    #[test]
    fn locate_key_ignores_prefix_matches() {
        let content = "[server]\nport_alt = 1\nport = 2\n";
        let span = locate_key(content, Some("server"), "port").expect("found");
        assert_eq!(span.offset(), content.find("port =").unwrap_or_default());
    }

    #[test]
    fn unknown_key_help_names_env_override() {
        let help = unknown_key_help(Some("server"), Some("admin_token"), &[]);
        assert_eq!(help, "did you mean `admin_token`? (env: MINWON_SERVER_ADMIN_TOKEN)");

        let keys = vec!["host".to_string(), "port".to_string()];
        assert_eq!(unknown_key_help(Some("server"), None, &keys), "[server] accepts: host, port");
    }

    #[test]
    fn relay_rule_renders_key_and_hint() {
        let err = ConfigError::relay(RelayRule::UrgentMarker, "must not be empty");
        assert_eq!(err.to_string(), "`relay.urgent_marker` must not be empty");
        let rendered = render_to_string(&[err]);
        assert!(rendered.contains("minwon::config::relay"));
        assert!(rendered.contains("[긴급]"));
    }

    #[test]
    fn invalid_value_help_points_at_env_var() {
        let err = ConfigError::invalid("anthropic.max_tokens", "must be greater than 0");
        let help = err.help().map(|h| h.to_string()).unwrap_or_default();
        assert!(help.contains("MINWON_ANTHROPIC_MAX_TOKENS"));
    }
}
