use std::env;
use std::fs;
use std::path::Path;

use secrecy::ExposeSecret;
use toml::Value;
use vanguide_core::config::{resolve_config_path, AppConfig, LoadOptions};

struct FileContext<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let file = FileContext { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let api_key = config
        .summarizer
        .api_key
        .as_ref()
        .map(|key| redact_token(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    let fields: [(&str, String, &[&str]); 10] = [
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            &["VANGUIDE_SERVER_BIND_ADDRESS"],
        ),
        ("server.port", config.server.port.to_string(), &["VANGUIDE_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["VANGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        (
            "summarizer.mode",
            format!("{:?}", config.summarizer.mode),
            &["VANGUIDE_SUMMARIZER_MODE", "OPENAI_MODE"],
        ),
        ("summarizer.api_key", api_key, &["VANGUIDE_SUMMARIZER_API_KEY", "OPENAI_API_KEY"]),
        (
            "summarizer.base_url",
            config.summarizer.base_url.clone(),
            &["VANGUIDE_SUMMARIZER_BASE_URL"],
        ),
        (
            "summarizer.model",
            config.summarizer.model.clone(),
            &["VANGUIDE_SUMMARIZER_MODEL", "OPENAI_MODEL"],
        ),
        (
            "summarizer.timeout_secs",
            config.summarizer.timeout_secs.to_string(),
            &["VANGUIDE_SUMMARIZER_TIMEOUT_SECS"],
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            &["VANGUIDE_LOGGING_LEVEL", "VANGUIDE_LOG_LEVEL"],
        ),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["VANGUIDE_LOGGING_FORMAT", "VANGUIDE_LOG_FORMAT"],
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(
        fields
            .iter()
            .map(|(key, value, env_keys)| {
                render_line(key, value, field_source(key, env_keys, &file))
            }),
    );
    lines.push(format!(
        "- summarizer.effective = {}",
        if config.summarizer.model_enabled() { "model" } else { "fallback" }
    ));

    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(key_path: &str, env_keys: &[&str], file: &FileContext<'_>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file.doc {
        if contains_path(doc, key_path) {
            let file_path = file
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::{contains_path, redact_token};

    #[test]
    fn redaction_keeps_only_the_key_prefix() {
        assert_eq!(redact_token("sk-live-abc123"), "sk-***");
        assert_eq!(redact_token("opaque"), "<redacted>");
        assert_eq!(redact_token("   "), "<empty>");
    }

    #[test]
    fn nested_key_paths_resolve_against_toml() {
        let doc: Value = "[summarizer]\nmodel = \"gpt-4o-mini\"\n".parse().expect("toml");
        assert!(contains_path(&doc, "summarizer.model"));
        assert!(!contains_path(&doc, "summarizer.api_key"));
        assert!(!contains_path(&doc, "server.port"));
    }
}
