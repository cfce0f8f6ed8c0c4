use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required env var: {0}")]
    MissingEnv(String),
    #[error("summoner name must be in `name#tag` form, got {0:?}")]
    MalformedRiotId(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub riot: RiotConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RiotConfig {
    /// API key - loaded from env RIOT_API_KEY
    #[serde(default)]
    pub api_key: String,
    /// Regional route for account-v1 (e.g. "asia", "americas")
    #[serde(default = "default_account_region")]
    pub account_region: String,
    /// Platform route for spectator and league endpoints (e.g. "kr")
    #[serde(default = "default_platform_region")]
    pub platform_region: String,
    /// Regional route for match-v5
    #[serde(default = "default_match_region")]
    pub match_region: String,
    /// Versioned Data Dragon champion table
    #[serde(default = "default_champion_data_url")]
    pub champion_data_url: String,
    /// `{region}` is replaced with the route for each call.
    #[serde(default = "default_api_base_template")]
    pub api_base_template: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_champion_timeout")]
    pub champion_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Target player in `name#tag` form.
    pub summoner_name: String,
    /// Label used in notifications. Falls back to the game name.
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_profile_url_base")]
    pub profile_url_base: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    Console,
    Webhook,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifierConfig {
    #[serde(default = "default_notifier_kind")]
    pub kind: NotifierKind,
    /// Destination channel identifier handed to the notifier on every send.
    #[serde(default = "default_channel")]
    pub channel: String,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_account_region() -> String {
    "asia".to_string()
}
fn default_platform_region() -> String {
    "kr".to_string()
}
fn default_match_region() -> String {
    "asia".to_string()
}
fn default_champion_data_url() -> String {
    "https://ddragon.leagueoflegends.com/cdn/15.3.1/data/en_US/champion.json".to_string()
}
fn default_api_base_template() -> String {
    "https://{region}.api.riotgames.com".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_champion_timeout() -> u64 {
    5
}
fn default_poll_interval() -> u64 {
    60
}
fn default_profile_url_base() -> String {
    "https://lol.ps/summoner".to_string()
}
fn default_notifier_kind() -> NotifierKind {
    NotifierKind::Console
}
fn default_channel() -> String {
    "game-alerts".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            kind: default_notifier_kind(),
            channel: default_channel(),
            webhook_url: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl RiotConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn champion_timeout(&self) -> Duration {
        Duration::from_secs(self.champion_timeout_secs)
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Config {
    /// Load config from a TOML file, then overlay environment variables for secrets.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.overlay_env();
        Ok(config)
    }

    /// Build the config entirely from the environment (no file needed).
    pub fn from_env() -> Result<Self, ConfigError> {
        let summoner_name = std::env::var("SUMMONER_NAME")
            .map_err(|_| ConfigError::MissingEnv("SUMMONER_NAME".to_string()))?;

        let mut config = Config {
            riot: RiotConfig {
                api_key: String::new(),
                account_region: default_account_region(),
                platform_region: default_platform_region(),
                match_region: default_match_region(),
                champion_data_url: default_champion_data_url(),
                api_base_template: default_api_base_template(),
                request_timeout_secs: default_request_timeout(),
                champion_timeout_secs: default_champion_timeout(),
            },
            monitor: MonitorConfig {
                summoner_name,
                display_name: None,
                poll_interval_secs: default_poll_interval(),
                profile_url_base: default_profile_url_base(),
            },
            notifier: NotifierConfig::default(),
            logging: LoggingConfig::default(),
        };
        config.overlay_env();
        Ok(config)
    }

    /// Secrets and selectors from the environment win over the file.
    fn overlay_env(&mut self) {
        if let Ok(key) = std::env::var("RIOT_API_KEY") {
            self.riot.api_key = key;
        }
        if let Ok(region) = std::env::var("RIOT_REGION") {
            self.riot.account_region = region;
        }
        if let Ok(region) = std::env::var("RIOT_SUMMONER_REGION") {
            self.riot.platform_region = region;
        }
        if let Ok(region) = std::env::var("RIOT_MATCH_REGION") {
            self.riot.match_region = region;
        }
        if let Ok(url) = std::env::var("CHAMPION_DATA_URL") {
            self.riot.champion_data_url = url;
        }
        if let Ok(name) = std::env::var("SUMMONER_NAME") {
            self.monitor.summoner_name = name;
        }
        if let Ok(label) = std::env::var("SUMMONER_DISPLAY_NAME") {
            self.monitor.display_name = Some(label);
        }
        if let Ok(kind) = std::env::var("NOTIFIER_KIND") {
            match kind.to_ascii_lowercase().as_str() {
                "console" => self.notifier.kind = NotifierKind::Console,
                "webhook" => self.notifier.kind = NotifierKind::Webhook,
                other => tracing::warn!(kind = other, "ignoring unknown NOTIFIER_KIND"),
            }
        }
        if let Ok(channel) = std::env::var("NOTIFY_CHANNEL") {
            self.notifier.channel = channel;
        }
        if let Ok(url) = std::env::var("NOTIFY_WEBHOOK_URL") {
            self.notifier.webhook_url = Some(url);
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.riot.api_key.is_empty()
    }

    /// Checks everything the monitor needs before it starts polling.
    /// `require_credentials` is false in simulation mode.
    pub fn validate(&self, require_credentials: bool) -> Result<(), ConfigError> {
        if require_credentials && !self.has_credentials() {
            return Err(ConfigError::MissingEnv("RIOT_API_KEY".to_string()));
        }
        split_riot_id(&self.monitor.summoner_name)?;
        if self.monitor.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "monitor.poll_interval_secs must be positive".to_string(),
            ));
        }
        if self.notifier.kind == NotifierKind::Webhook
            && self.notifier.webhook_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::Invalid(
                "notifier.kind = \"webhook\" requires notifier.webhook_url".to_string(),
            ));
        }
        Ok(())
    }

    /// Label used for the player in notification text.
    pub fn display_name(&self) -> String {
        if let Some(label) = self.monitor.display_name.as_deref().filter(|l| !l.is_empty()) {
            return label.to_string();
        }
        split_riot_id(&self.monitor.summoner_name)
            .map(|(name, _)| name.to_string())
            .unwrap_or_else(|_| self.monitor.summoner_name.clone())
    }
}

/// Split `name#tag` at the first `#`. Both halves must be non-empty.
pub fn split_riot_id(riot_id: &str) -> Result<(&str, &str), ConfigError> {
    match riot_id.split_once('#') {
        Some((name, tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {
            Ok((name.trim(), tag.trim()))
        }
        _ => Err(ConfigError::MalformedRiotId(riot_id.to_string())),
    }
}
