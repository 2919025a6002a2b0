// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `minwon check` command implementation.
//!
//! Runs startup checks against the loaded configuration so problems show up
//! before the server is put behind the skill webhook.

use std::path::Path;
use std::time::{Duration, Instant};

use minwon_config::model::{AgentConfig, MinwonConfig, ServerConfig};
use minwon_core::MinwonError;

/// Status of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name,
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Runs the `minwon check` command.
///
/// With `online`, also sends a HEAD request to the completion endpoint.
/// Returns an error when any check fails; warnings do not fail the run.
pub async fn run_check(config: &MinwonConfig, online: bool) -> Result<(), MinwonError> {
    let env_key = std::env::var("ANTHROPIC_API_KEY").ok();
    let mut results = vec![
        CheckResult::new("Configuration", CheckStatus::Pass, "valid", Instant::now()),
        check_api_key(config.anthropic.api_key.as_deref(), env_key.as_deref()),
        check_system_prompt(&config.agent).await,
        check_admin_token(&config.server),
        check_database(&config.storage.database_path).await,
    ];
    if online {
        results.push(check_api_reachable(&config.anthropic.base_url).await);
    }

    println!();
    println!("  minwon check");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;
    for result in &results {
        let tag = match result.status {
            CheckStatus::Pass => "[OK]  ",
            CheckStatus::Warn => {
                warn_count += 1;
                "[WARN]"
            }
            CheckStatus::Fail => {
                fail_count += 1;
                "[FAIL]"
            }
        };
        println!(
            "    {tag} {:<20} {} ({}ms)",
            result.name,
            result.message,
            result.duration.as_millis()
        );
    }
    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
    } else {
        println!("  All checks passed.");
    }
    println!();

    if fail_count > 0 {
        return Err(MinwonError::Config(format!("{fail_count} check(s) failed")));
    }
    Ok(())
}

/// The API key may come from config or from `ANTHROPIC_API_KEY`.
fn check_api_key(configured: Option<&str>, env: Option<&str>) -> CheckResult {
    let start = Instant::now();
    let present = |k: Option<&str>| k.is_some_and(|k| !k.trim().is_empty());
    if present(configured) {
        CheckResult::new("Anthropic API key", CheckStatus::Pass, "set in config", start)
    } else if present(env) {
        CheckResult::new("Anthropic API key", CheckStatus::Pass, "set via ANTHROPIC_API_KEY", start)
    } else {
        CheckResult::new(
            "Anthropic API key",
            CheckStatus::Fail,
            "missing: set anthropic.api_key or ANTHROPIC_API_KEY",
            start,
        )
    }
}

async fn check_system_prompt(agent: &AgentConfig) -> CheckResult {
    let start = Instant::now();
    let Some(path) = &agent.system_prompt_file else {
        let source = if agent.system_prompt.is_some() { "inline" } else { "built-in default" };
        return CheckResult::new("System prompt", CheckStatus::Pass, source, start);
    };

    match tokio::fs::read_to_string(path).await {
        Ok(content) if !content.trim().is_empty() => {
            CheckResult::new("System prompt", CheckStatus::Pass, format!("file {path}"), start)
        }
        Ok(_) => CheckResult::new(
            "System prompt",
            CheckStatus::Warn,
            format!("{path} is empty, falling back"),
            start,
        ),
        Err(e) => CheckResult::new(
            "System prompt",
            CheckStatus::Warn,
            format!("cannot read {path}: {e}, falling back"),
            start,
        ),
    }
}

fn check_admin_token(server: &ServerConfig) -> CheckResult {
    let start = Instant::now();
    match &server.admin_token {
        Some(_) => CheckResult::new("Admin API", CheckStatus::Pass, "token configured", start),
        None => CheckResult::new(
            "Admin API",
            CheckStatus::Warn,
            "no server.admin_token: admin routes reject every request",
            start,
        ),
    }
}

/// Check the database file can be opened.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();
    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    let conn = match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => conn,
        Err(e) => {
            return CheckResult::new("Database", CheckStatus::Fail, format!("open failed: {e}"), start);
        }
    };
    let query_result = conn
        .call(|conn| -> Result<(), rusqlite::Error> { conn.execute_batch("SELECT 1") })
        .await;
    match query_result {
        Ok(()) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
        Err(e) => CheckResult::new("Database", CheckStatus::Fail, format!("query failed: {e}"), start),
    }
}

/// HEAD request to the messages endpoint. Any HTTP answer counts as reachable.
async fn check_api_reachable(base_url: &str) -> CheckResult {
    let start = Instant::now();
    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            return CheckResult::new("Anthropic API", CheckStatus::Fail, format!("HTTP client error: {e}"), start);
        }
    };

    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));
    match client.head(&url).send().await {
        Ok(_) => CheckResult::new("Anthropic API", CheckStatus::Pass, "reachable", start),
        Err(e) => {
            let msg = if e.is_timeout() {
                "timeout (5s)".to_string()
            } else {
                format!("unreachable: {e}")
            };
            CheckResult::new("Anthropic API", CheckStatus::Fail, msg, start)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_from_config_or_env() {
        assert_eq!(check_api_key(Some("sk"), None).status, CheckStatus::Pass);
        assert_eq!(check_api_key(None, Some("sk")).status, CheckStatus::Pass);
        assert_eq!(check_api_key(Some("  "), None).status, CheckStatus::Fail);
        assert_eq!(check_api_key(None, None).status, CheckStatus::Fail);
    }

    #[test]
    fn missing_admin_token_warns() {
        let server = ServerConfig::default();
        assert_eq!(check_admin_token(&server).status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn unreadable_prompt_file_warns() {
        let agent = AgentConfig {
            system_prompt_file: Some("/nonexistent/minwon/prompt.md".into()),
            ..AgentConfig::default()
        };
        assert_eq!(check_system_prompt(&agent).await.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn missing_database_warns_existing_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minwon.db");
        let path = path.to_str().unwrap();
        assert_eq!(check_database(path).await.status, CheckStatus::Warn);

        std::fs::write(path, b"").unwrap();
        assert_eq!(check_database(path).await.status, CheckStatus::Pass);
    }
}
