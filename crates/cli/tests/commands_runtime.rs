use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use vanguide_cli::commands::{config, doctor, seed, smoke};

#[test]
fn seed_returns_catalog_summary_as_json() {
    with_env(&[], || {
        let result = seed::run();
        assert_eq!(result.exit_code, 0, "expected seed success");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "seed");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "catalog seeded: 6 vans, 8 options");
        assert_eq!(payload["data"]["summary"]["vanCount"], 6);
        assert_eq!(payload["data"]["summary"]["optionCount"], 8);
        assert_eq!(payload["data"]["summary"]["activeSessions"], 0);
        assert_eq!(payload["data"]["vanIds"].as_array().map(Vec::len), Some(6));
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    with_env(&[], || {
        let first = parse_payload(&seed::run().output);
        let second = parse_payload(&seed::run().output);
        assert_eq!(first, second);
    });
}

#[test]
fn smoke_returns_success_report_with_default_config() {
    with_env(&[], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 0, "expected successful smoke report: {}", result.output);

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "pass");

        let names: Vec<&str> = payload["checks"]
            .as_array()
            .map(|checks| checks.iter().filter_map(|check| check["name"].as_str()).collect())
            .unwrap_or_default();
        assert_eq!(
            names,
            [
                "config_validation",
                "guided_session_start",
                "option_toggle",
                "submission",
                "compatibility_fix",
                "ops_board",
                "support_summary",
            ]
        );
        assert!(result.output.starts_with("smoke: 7/7 checks passed"));
    });
}

#[test]
fn smoke_returns_failure_when_config_invalid() {
    with_env(&[("VANGUIDE_SERVER_PORT", "0")], || {
        let result = smoke::run();
        assert_eq!(result.exit_code, 6, "expected smoke failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "smoke");
        assert_eq!(payload["status"], "fail");
        assert_eq!(payload["checks"][0]["status"], "fail");
        assert_eq!(payload["checks"][1]["status"], "skipped");
        assert_eq!(payload["checks"][6]["status"], "skipped");
    });
}

#[test]
fn doctor_json_passes_in_fallback_mode() {
    with_env(&[("VANGUIDE_SUMMARIZER_MODE", "fallback")], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 0, "expected doctor pass: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][0]["name"], "config_validation");
        assert_eq!(payload["checks"][1]["name"], "summarizer_readiness");
        assert!(payload["checks"][1]["details"]
            .as_str()
            .unwrap_or_default()
            .starts_with("deterministic fallback"));
        assert_eq!(payload["checks"][2]["name"], "catalog_integrity");
        assert_eq!(payload["checks"][2]["status"], "pass");
    });
}

#[test]
fn doctor_reports_config_failure_and_skips_summarizer() {
    with_env(&[("VANGUIDE_SUMMARIZER_TIMEOUT_SECS", "0")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] summarizer_readiness:"));
        assert!(result.output.contains("- [ok] catalog_integrity:"));
    });
}

#[test]
fn config_attributes_sources_and_redacts_api_key() {
    with_env(
        &[("OPENAI_API_KEY", "sk-live-secret"), ("VANGUIDE_SERVER_PORT", "9300")],
        || {
            let output = config::run();

            assert!(output.contains("- server.port = 9300 (source: env (VANGUIDE_SERVER_PORT))"));
            assert!(
                output.contains("- summarizer.api_key = sk-*** (source: env (OPENAI_API_KEY))")
            );
            assert!(!output.contains("sk-live-secret"));
            assert!(output.contains("- summarizer.effective = model"));
        },
    );
}

#[test]
fn config_without_key_reports_fallback() {
    with_env(&[], || {
        let output = config::run();
        assert!(output.contains("- summarizer.api_key = <unset>"));
        assert!(output.contains("- summarizer.effective = fallback"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "VANGUIDE_SERVER_BIND_ADDRESS",
        "VANGUIDE_SERVER_PORT",
        "VANGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "VANGUIDE_SUMMARIZER_MODE",
        "VANGUIDE_SUMMARIZER_API_KEY",
        "VANGUIDE_SUMMARIZER_BASE_URL",
        "VANGUIDE_SUMMARIZER_MODEL",
        "VANGUIDE_SUMMARIZER_TIMEOUT_SECS",
        "VANGUIDE_LOGGING_LEVEL",
        "VANGUIDE_LOGGING_FORMAT",
        "VANGUIDE_LOG_LEVEL",
        "VANGUIDE_LOG_FORMAT",
        "OPENAI_MODE",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
