use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "vanguide.toml";
pub const DEFAULT_SUMMARIZER_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SUMMARIZER_MODEL: &str = "gpt-4o-mini";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub summarizer: SummarizerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct SummarizerConfig {
    pub mode: SummarizerMode,
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl SummarizerConfig {
    /// Whether a remote model call will be attempted at all.
    pub fn model_enabled(&self) -> bool {
        self.mode == SummarizerMode::Auto
            && self.api_key.as_ref().is_some_and(|key| !key.expose_secret().trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizerMode {
    /// Call the model when an api key is configured, otherwise fall back.
    Auto,
    /// Never leave the process.
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub summarizer_mode: Option<SummarizerMode>,
    pub summarizer_model: Option<String>,
    pub summarizer_api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                graceful_shutdown_secs: 15,
            },
            summarizer: SummarizerConfig {
                mode: SummarizerMode::Auto,
                api_key: None,
                base_url: DEFAULT_SUMMARIZER_BASE_URL.to_string(),
                model: DEFAULT_SUMMARIZER_MODEL.to_string(),
                timeout_secs: 10,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for SummarizerMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "fallback" => Ok(Self::Fallback),
            other => Err(ConfigError::Validation(format!(
                "unsupported summarizer mode `{other}` (expected auto|fallback)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(summarizer) = patch.summarizer {
            if let Some(mode) = summarizer.mode {
                self.summarizer.mode = mode;
            }
            if let Some(api_key) = summarizer.api_key {
                self.summarizer.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = summarizer.base_url {
                self.summarizer.base_url = base_url;
            }
            if let Some(model) = summarizer.model {
                self.summarizer.model = model;
            }
            if let Some(timeout_secs) = summarizer.timeout_secs {
                self.summarizer.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("VANGUIDE_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("VANGUIDE_SERVER_PORT") {
            self.server.port = parse_u16("VANGUIDE_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("VANGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("VANGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let mode = read_env("VANGUIDE_SUMMARIZER_MODE").or_else(|| read_env("OPENAI_MODE"));
        if let Some(value) = mode {
            self.summarizer.mode = value.parse()?;
        }
        let api_key =
            read_env("VANGUIDE_SUMMARIZER_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = api_key {
            self.summarizer.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("VANGUIDE_SUMMARIZER_BASE_URL") {
            self.summarizer.base_url = value;
        }
        let model = read_env("VANGUIDE_SUMMARIZER_MODEL").or_else(|| read_env("OPENAI_MODEL"));
        if let Some(value) = model {
            self.summarizer.model = value;
        }
        if let Some(value) = read_env("VANGUIDE_SUMMARIZER_TIMEOUT_SECS") {
            self.summarizer.timeout_secs = parse_u64("VANGUIDE_SUMMARIZER_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("VANGUIDE_LOGGING_LEVEL").or_else(|| read_env("VANGUIDE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("VANGUIDE_LOGGING_FORMAT").or_else(|| read_env("VANGUIDE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(bind_address) = overrides.bind_address {
            self.server.bind_address = bind_address;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(mode) = overrides.summarizer_mode {
            self.summarizer.mode = mode;
        }
        if let Some(model) = overrides.summarizer_model {
            self.summarizer.model = model;
        }
        if let Some(api_key) = overrides.summarizer_api_key {
            self.summarizer.api_key = Some(secret_value(api_key));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_summarizer(&self.summarizer)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// Config file that [`AppConfig::load`] would read, if any.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from("config").join(DEFAULT_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_summarizer(summarizer: &SummarizerConfig) -> Result<(), ConfigError> {
    if summarizer.timeout_secs == 0 || summarizer.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "summarizer.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let base_url = summarizer.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "summarizer.base_url must start with http:// or https://".to_string(),
        ));
    }

    if summarizer.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "summarizer.model must not be empty (default is gpt-4o-mini)".to_string(),
        ));
    }

    // a missing api key only downgrades the summarizer to its fallback
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    summarizer: Option<SummarizerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct SummarizerPatch {
    mode: Option<SummarizerMode>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat, SummarizerMode};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const CONFIG_VARS: &[&str] = &[
        "VANGUIDE_SERVER_BIND_ADDRESS",
        "VANGUIDE_SERVER_PORT",
        "VANGUIDE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "VANGUIDE_SUMMARIZER_MODE",
        "VANGUIDE_SUMMARIZER_API_KEY",
        "VANGUIDE_SUMMARIZER_BASE_URL",
        "VANGUIDE_SUMMARIZER_MODEL",
        "VANGUIDE_SUMMARIZER_TIMEOUT_SECS",
        "VANGUIDE_LOGGING_LEVEL",
        "VANGUIDE_LOG_LEVEL",
        "VANGUIDE_LOGGING_FORMAT",
        "VANGUIDE_LOG_FORMAT",
        "OPENAI_MODE",
        "OPENAI_API_KEY",
        "OPENAI_MODEL",
    ];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_file_or_api_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(config.server.port == 8080, "default port should be 8080")?;
        ensure(config.summarizer.model == "gpt-4o-mini", "default model should be gpt-4o-mini")?;
        ensure(config.summarizer.api_key.is_none(), "no api key should be configured")?;
        ensure(!config.summarizer.model_enabled(), "summarizer should degrade to fallback")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("TEST_VANGUIDE_SUMMARIZER_KEY", "sk-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("vanguide.toml");
            fs::write(
                &path,
                r#"
[summarizer]
api_key = "${TEST_VANGUIDE_SUMMARIZER_KEY}"
model = "gpt-4o"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            let key = config.summarizer.api_key.as_ref().map(|key| key.expose_secret().to_string());
            ensure(key.as_deref() == Some("sk-from-env"), "api key should come from environment")?;
            ensure(config.summarizer.model == "gpt-4o", "model should come from file")?;
            ensure(config.summarizer.model_enabled(), "summarizer should call the model")
        })();

        clear_vars(&["TEST_VANGUIDE_SUMMARIZER_KEY"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("VANGUIDE_LOG_LEVEL", "warn");
        env::set_var("VANGUIDE_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(CONFIG_VARS);
        result
    }

    #[test]
    fn openai_variables_fill_in_for_unset_prefixed_ones() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("OPENAI_MODE", "fallback");
        env::set_var("OPENAI_MODEL", "gpt-legacy");
        env::set_var("VANGUIDE_SUMMARIZER_MODEL", "gpt-4o-mini");
        env::set_var("OPENAI_API_KEY", "sk-openai");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.summarizer.mode == SummarizerMode::Fallback, "mode alias should apply")?;
            ensure(config.summarizer.model == "gpt-4o-mini", "prefixed model should win")?;
            ensure(config.summarizer.api_key.is_some(), "api key alias should apply")?;
            ensure(!config.summarizer.model_enabled(), "fallback mode disables the model")
        })();

        clear_vars(CONFIG_VARS);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("VANGUIDE_SERVER_PORT", "9100");
        env::set_var("VANGUIDE_SERVER_BIND_ADDRESS", "0.0.0.0");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("vanguide.toml");
            fs::write(
                &path,
                r#"
[server]
bind_address = "10.0.0.1"
port = 9000
graceful_shutdown_secs = 30

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    port: Some(9200),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.server.port == 9200, "override port should win")?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.server.bind_address == "0.0.0.0",
                "env bind address should win over file",
            )?;
            ensure(config.server.graceful_shutdown_secs == 30, "file value should win over default")
        })();

        clear_vars(CONFIG_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("VANGUIDE_SUMMARIZER_BASE_URL", "ftp://models.internal");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("summarizer.base_url")
            );
            ensure(has_message, "validation failure should mention summarizer.base_url")
        })();

        clear_vars(CONFIG_VARS);
        result
    }

    #[test]
    fn invalid_numeric_env_is_reported_with_key() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("VANGUIDE_SERVER_PORT", "eighty");
        let result = AppConfig::load(LoadOptions::default());
        clear_vars(CONFIG_VARS);

        ensure(
            matches!(
                result,
                Err(ConfigError::InvalidEnvOverride { ref key, .. })
                    if key == "VANGUIDE_SERVER_PORT"
            ),
            "non-numeric port should be rejected",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(CONFIG_VARS);

        env::set_var("VANGUIDE_SUMMARIZER_API_KEY", "sk-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("sk-secret-value"), "debug output should not contain api key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )
        })();

        clear_vars(CONFIG_VARS);
        result
    }
}
