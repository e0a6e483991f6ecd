//! Configuration management

use serde::{Deserialize, Serialize};

use crate::application::errors::ConfigError;

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub telegram: TelegramConfig,
    pub community: CommunityConfig,
    pub events: EventsConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Debug/dev mode: logs the configured credentials at startup.
    pub dev: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommunityConfig {
    /// Meetup group names the bot announces for.
    pub groups: Vec<String>,
    /// Fixed UTC offset used for event times and expiry math.
    pub timezone_hours: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EventsConfig {
    pub meetup_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinksConfig {
    /// Base URL serving `social_links.json`, optional.
    pub remote_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "ajubot".to_string(),
                dev: false,
            },
            telegram: TelegramConfig { token: None },
            community: CommunityConfig {
                groups: Vec::new(),
                timezone_hours: -3,
            },
            events: EventsConfig { meetup_key: None },
            links: LinksConfig { remote_url: None },
        }
    }
}

impl Config {
    /// Loads the YAML config file at `path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Builds a config from environment variables only.
    pub fn load_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overrides fields from environment variables, when set:
    /// `TELEGRAM_TOKEN`, `GROUP_NAME` (comma-separated), `MEETUP_KEY`,
    /// `REMOTE_RESOURCES_URL`.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("TELEGRAM_TOKEN") {
            if !token.is_empty() {
                self.telegram.token = Some(token);
            }
        }
        if let Ok(groups) = std::env::var("GROUP_NAME") {
            if !groups.is_empty() {
                self.community.groups = groups
                    .split(',')
                    .map(|group| group.trim().to_string())
                    .filter(|group| !group.is_empty())
                    .collect();
            }
        }
        if let Ok(key) = std::env::var("MEETUP_KEY") {
            if !key.is_empty() {
                self.events.meetup_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("REMOTE_RESOURCES_URL") {
            if !url.is_empty() {
                self.links.remote_url = Some(url);
            }
        }
    }

    /// Full startup resolution: the environment overlays the file values and
    /// CLI overrides win over both.
    pub fn resolve(&mut self, token_override: Option<String>, dev: bool) {
        self.apply_env();
        if let Some(token) = token_override {
            self.telegram.token = Some(token);
        }
        if dev {
            self.bot.dev = true;
        }
    }

    /// Checks that every required startup parameter is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram.token.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingField("telegram.token"));
        }
        if self.community.groups.is_empty() {
            return Err(ConfigError::MissingField("community.groups"));
        }
        // Without an API key no events source is usable, refuse to start.
        if self.events.meetup_key.as_deref().unwrap_or("").is_empty() {
            return Err(ConfigError::MissingField("events.meetup-key"));
        }
        Ok(())
    }

    /// The configured Telegram token; fails with the same error `validate` reports.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        match self.telegram.token.as_deref() {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ConfigError::MissingField("telegram.token")),
        }
    }
}
