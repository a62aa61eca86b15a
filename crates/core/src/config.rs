use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::lookup::{RandomWordPolicy, DEFAULT_RANDOM_THRESHOLD};
use crate::retry::RetryPolicy;

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.urbandictionary.com/v0";
pub const DEFAULT_EMPTY_TEXT_REPLY: &str = "Give me a word to look up, e.g. `/urban yeet`.";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub random: RandomConfig,
    pub bot: BotConfig,
    pub slack: SlackConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Clone, Debug)]
pub struct RandomConfig {
    pub threshold: i64,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Clone, Debug)]
pub struct BotConfig {
    pub version: String,
    pub empty_text_reply: String,
}

#[derive(Clone, Debug, Default)]
pub struct SlackConfig {
    pub signing_secret: Option<SecretString>,
    pub verification_token: Option<SecretString>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
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
    pub upstream_base_url: Option<String>,
    pub random_threshold: Option<i64>,
    pub random_max_retries: Option<u32>,
    pub log_level: Option<String>,
    pub signing_secret: Option<String>,
    pub verification_token: Option<String>,
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
                bind_address: "0.0.0.0".to_string(),
                port: 61000,
                request_timeout_secs: 20,
                graceful_shutdown_secs: 10,
            },
            upstream: UpstreamConfig {
                base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
                timeout_secs: 8,
                user_agent: format!("urbanobot/{}", env!("CARGO_PKG_VERSION")),
            },
            random: RandomConfig {
                threshold: DEFAULT_RANDOM_THRESHOLD,
                max_retries: 10,
                base_delay_ms: 100,
                max_delay_ms: 2_000,
            },
            bot: BotConfig {
                version: env!("CARGO_PKG_VERSION").to_string(),
                empty_text_reply: DEFAULT_EMPTY_TEXT_REPLY.to_string(),
            },
            slack: SlackConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
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

impl RandomConfig {
    pub fn policy(&self) -> RandomWordPolicy {
        RandomWordPolicy {
            threshold: self.threshold,
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_delay_ms: self.base_delay_ms,
                max_delay_ms: self.max_delay_ms,
            },
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("urbano.toml"));
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
            if let Some(request_timeout_secs) = server.request_timeout_secs {
                self.server.request_timeout_secs = request_timeout_secs;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(upstream) = patch.upstream {
            if let Some(base_url) = upstream.base_url {
                self.upstream.base_url = base_url;
            }
            if let Some(timeout_secs) = upstream.timeout_secs {
                self.upstream.timeout_secs = timeout_secs;
            }
            if let Some(user_agent) = upstream.user_agent {
                self.upstream.user_agent = user_agent;
            }
        }

        if let Some(random) = patch.random {
            if let Some(threshold) = random.threshold {
                self.random.threshold = threshold;
            }
            if let Some(max_retries) = random.max_retries {
                self.random.max_retries = max_retries;
            }
            if let Some(base_delay_ms) = random.base_delay_ms {
                self.random.base_delay_ms = base_delay_ms;
            }
            if let Some(max_delay_ms) = random.max_delay_ms {
                self.random.max_delay_ms = max_delay_ms;
            }
        }

        if let Some(bot) = patch.bot {
            if let Some(version) = bot.version {
                self.bot.version = version;
            }
            if let Some(empty_text_reply) = bot.empty_text_reply {
                self.bot.empty_text_reply = empty_text_reply;
            }
        }

        if let Some(slack) = patch.slack {
            if let Some(signing_secret_value) = slack.signing_secret {
                self.slack.signing_secret = Some(secret_value(signing_secret_value));
            }
            if let Some(verification_token_value) = slack.verification_token {
                self.slack.verification_token = Some(secret_value(verification_token_value));
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
        if let Some(value) = read_env("URBANO_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        let port = read_env("URBANO_SERVER_PORT").map(|value| ("URBANO_SERVER_PORT", value));
        if let Some((key, value)) = port.or_else(|| read_env("PORT").map(|value| ("PORT", value)))
        {
            self.server.port = parse_u16(key, &value)?;
        }
        if let Some(value) = read_env("URBANO_SERVER_REQUEST_TIMEOUT_SECS") {
            self.server.request_timeout_secs =
                parse_u64("URBANO_SERVER_REQUEST_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("URBANO_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("URBANO_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        if let Some(value) = read_env("URBANO_UPSTREAM_BASE_URL") {
            self.upstream.base_url = value;
        }
        if let Some(value) = read_env("URBANO_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = parse_u64("URBANO_UPSTREAM_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = read_env("URBANO_UPSTREAM_USER_AGENT") {
            self.upstream.user_agent = value;
        }

        if let Some(value) = read_env("URBANO_RANDOM_THRESHOLD") {
            self.random.threshold = parse_i64("URBANO_RANDOM_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("URBANO_RANDOM_MAX_RETRIES") {
            self.random.max_retries = parse_u32("URBANO_RANDOM_MAX_RETRIES", &value)?;
        }
        if let Some(value) = read_env("URBANO_RANDOM_BASE_DELAY_MS") {
            self.random.base_delay_ms = parse_u64("URBANO_RANDOM_BASE_DELAY_MS", &value)?;
        }
        if let Some(value) = read_env("URBANO_RANDOM_MAX_DELAY_MS") {
            self.random.max_delay_ms = parse_u64("URBANO_RANDOM_MAX_DELAY_MS", &value)?;
        }

        if let Some(value) = read_env("URBANO_BOT_VERSION") {
            self.bot.version = value;
        }
        if let Some(value) = read_env("URBANO_BOT_EMPTY_TEXT_REPLY") {
            self.bot.empty_text_reply = value;
        }

        if let Some(value) = read_env("URBANO_SLACK_SIGNING_SECRET") {
            self.slack.signing_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("URBANO_SLACK_VERIFICATION_TOKEN") {
            self.slack.verification_token = Some(secret_value(value));
        }

        let log_level = read_env("URBANO_LOGGING_LEVEL").or_else(|| read_env("URBANO_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("URBANO_LOGGING_FORMAT").or_else(|| read_env("URBANO_LOG_FORMAT"));
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
        if let Some(base_url) = overrides.upstream_base_url {
            self.upstream.base_url = base_url;
        }
        if let Some(threshold) = overrides.random_threshold {
            self.random.threshold = threshold;
        }
        if let Some(max_retries) = overrides.random_max_retries {
            self.random.max_retries = max_retries;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(signing_secret) = overrides.signing_secret {
            self.slack.signing_secret = Some(secret_value(signing_secret));
        }
        if let Some(verification_token) = overrides.verification_token {
            self.slack.verification_token = Some(secret_value(verification_token));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_upstream(&self.upstream)?;
        validate_random(&self.random)?;
        validate_bot(&self.bot)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("urbano.toml"), PathBuf::from("config/urbano.toml")]
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

    if server.request_timeout_secs == 0 || server.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "server.request_timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), ConfigError> {
    let base_url = upstream.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "upstream.base_url must start with http:// or https://".to_string(),
        ));
    }

    if upstream.timeout_secs == 0 || upstream.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "upstream.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    Ok(())
}

fn validate_random(random: &RandomConfig) -> Result<(), ConfigError> {
    if random.threshold < 0 {
        return Err(ConfigError::Validation(
            "random.threshold must not be negative".to_string(),
        ));
    }

    if random.max_retries > 100 {
        return Err(ConfigError::Validation(
            "random.max_retries must be in range 0..=100".to_string(),
        ));
    }

    if random.base_delay_ms > random.max_delay_ms {
        return Err(ConfigError::Validation(
            "random.base_delay_ms must not exceed random.max_delay_ms".to_string(),
        ));
    }

    Ok(())
}

fn validate_bot(bot: &BotConfig) -> Result<(), ConfigError> {
    if bot.version.trim().is_empty() {
        return Err(ConfigError::Validation("bot.version must not be empty".to_string()));
    }

    if bot.empty_text_reply.trim().is_empty() {
        return Err(ConfigError::Validation(
            "bot.empty_text_reply must not be empty".to_string(),
        ));
    }

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

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
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

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    upstream: Option<UpstreamPatch>,
    random: Option<RandomPatch>,
    bot: Option<BotPatch>,
    slack: Option<SlackPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    request_timeout_secs: Option<u64>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct UpstreamPatch {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RandomPatch {
    threshold: Option<i64>,
    max_retries: Option<u32>,
    base_delay_ms: Option<u64>,
    max_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct BotPatch {
    version: Option<String>,
    empty_text_reply: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SlackPatch {
    signing_secret: Option<String>,
    verification_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
