// SPDX-FileCopyrightText: 2026 Minwon Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Minwon configuration system.

use std::io::Write;

use miette::Diagnostic;
use minwon_config::diagnostic::{ConfigError, RelayRule};
use minwon_config::model::QuickReplyConfig;
use minwon_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_minwon_config() {
    let toml = r#"
[agent]
name = "building-17"
log_level = "debug"
system_prompt = "You help tenants."
building_info = "Boiler room is in B1."

[anthropic]
api_key = "sk-ant-123"
max_tokens = 300
timeout_secs = 20

[storage]
database_path = "/tmp/minwon-test.db"
wal_mode = false

[server]
host = "0.0.0.0"
port = 9000
admin_token = "secret"

[relay]
history_turns = 3
paused_delay_secs = 7
urgent_keywords = ["누수", "화재"]
owner_notify_url = "https://owner.example/notify"

[kakao]
callback_timeout_secs = 5
max_text_chars = 500

[[kakao.quick_replies]]
label = "📞 관리실"
message_text = "관리실 연락처"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "building-17");
    assert_eq!(config.agent.building_info.as_deref(), Some("Boiler room is in B1."));
    assert_eq!(config.anthropic.api_key.as_deref(), Some("sk-ant-123"));
    assert_eq!(config.anthropic.max_tokens, 300);
    assert_eq!(config.anthropic.default_model, "claude-haiku-4-5-20251001");
    assert_eq!(config.storage.database_path, "/tmp/minwon-test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.admin_token.as_deref(), Some("secret"));
    assert_eq!(config.relay.history_turns, 3);
    assert_eq!(config.relay.urgent_keywords, vec!["누수", "화재"]);
    assert_eq!(config.relay.urgent_marker, "[긴급]");
    assert_eq!(config.kakao.max_text_chars, 500);
    assert_eq!(
        config.kakao.quick_replies,
        vec![QuickReplyConfig {
            label: "📞 관리실".to_string(),
            message_text: "관리실 연락처".to_string(),
        }]
    );
}

/// Missing sections fall back to defaults.
#[test]
fn empty_toml_yields_defaults() {
    let config = load_and_validate_str("").expect("empty config is valid");
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.relay.paused_delay_secs, 6);
    assert_eq!(config.kakao.quick_replies.len(), 4);
}

#[test]
fn unknown_field_in_relay_produces_error() {
    let toml = r#"
[relay]
histroy_turns = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("histroy_turns"),
        "error should mention the bad key, got: {err_str}"
    );
}

#[test]
fn unknown_section_produces_error() {
    let err = load_config_from_str("[telegram]\nbot_token = \"x\"\n")
        .expect_err("unknown section should be rejected");
    assert!(format!("{err}").contains("telegram"));
}

/// Unknown keys surface as diagnostics with a suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = "[server]\nadmin_tokn = \"x\"\n";
    let errors = load_and_validate_str(toml).expect_err("should fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("admin_token"));
}

#[test]
fn unknown_key_in_file_is_pinned_and_names_env_var() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, "[relay]\nhistory_turns = 3\npaused_dealy_secs = 9\n").expect("write");
    let errors = load_and_validate_path(file.path()).expect_err("should fail");
    let unknown = errors
        .iter()
        .find(|e| matches!(e, ConfigError::UnknownKey { .. }))
        .expect("unknown key diagnostic");
    let ConfigError::UnknownKey { table, span, .. } = unknown else {
        unreachable!()
    };
    assert_eq!(table.as_deref(), Some("relay"));
    let span = span.as_ref().expect("span into the file");
    assert_eq!(span.offset(), "[relay]\nhistory_turns = 3\n".len());
    let help = unknown.help().map(|h| h.to_string()).unwrap_or_default();
    assert!(help.contains("`paused_delay_secs`"), "{help}");
    assert!(help.contains("MINWON_RELAY_PAUSED_DELAY_SECS"), "{help}");
}

#[test]
fn wrong_type_produces_invalid_type_diagnostic() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::WrongType { key, span: Some(_), .. } if key == "server.port"))
    );
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors =
        load_and_validate_str("[relay]\nmax_concurrent_jobs = 0\n").expect_err("should fail");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Relay { rule: RelayRule::MaxConcurrentJobs, .. }))
    );
}

#[test]
fn load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[agent]\nname = \"from-file\"").expect("write config");
    let config = load_and_validate_path(file.path()).expect("file config is valid");
    assert_eq!(config.agent.name, "from-file");
}
