//! Settings model, loading and validation
//!
//! The YAML settings file is deserialized into [`RawSettings`] (every section
//! optional) and then validated into [`Settings`], where required values are
//! guaranteed to be present.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::participant::{RunnerMap, Snowflake};

pub const DEFAULT_API_BASE_URL: &str = "https://api.challonge.com/v2.1";
pub const DEFAULT_TOKEN_URL: &str = "https://api.challonge.com/oauth/token";
pub const DEFAULT_PATH_SUFFIX: &str = ".json";
pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PER_PAGE: u32 = 25;

/// Error type for settings operations
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Missing required '{0}' section in config")]
    MissingSection(&'static str),

    #[error("Missing required {0} in config")]
    MissingKey(&'static str),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOAuthSettings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub token_url: Option<String>,
    pub scope: Option<String>,
    pub path_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChallongeSettings {
    pub tournament: Option<String>,
    pub subdomain: Option<String>,
    pub base_url: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDiscordSettings {
    pub bot_token: Option<String>,
    pub channel_id: Option<Snowflake>,
    pub thread_archive_minutes: Option<u32>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub role_ids_to_tag: Vec<Snowflake>,
}

/// Settings file as written, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    pub oauth2: Option<RawOAuthSettings>,
    pub challonge: Option<RawChallongeSettings>,
    pub discord: Option<RawDiscordSettings>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub runner_map: RunnerMap,
    pub thread_name_template: Option<String>,
    pub message_template: Option<String>,
    pub round_label_template: Option<String>,
}

/// OAuth2 client-credentials settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub scope: Option<String>,
    pub path_suffix: String,
}

/// Challonge tournament settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallongeSettings {
    pub tournament: String,
    pub subdomain: Option<String>,
    pub base_url: String,
    pub page: u32,
    pub per_page: u32,
    /// Optional match state filter ("open", "pending", "complete", "all")
    pub state: Option<String>,
}

impl ChallongeSettings {
    pub fn new(tournament: impl Into<String>) -> Self {
        Self {
            tournament: tournament.into(),
            subdomain: None,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
            state: None,
        }
    }

    /// Tournament identifier used in API paths: `{subdomain}-{tournament}` for
    /// community tournaments, `{tournament}` otherwise
    pub fn api_slug(&self) -> String {
        match &self.subdomain {
            Some(subdomain) => format!("{subdomain}-{}", self.tournament),
            None => self.tournament.clone(),
        }
    }
}

/// Discord thread auto-archive duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveDuration {
    OneHour,
    OneDay,
    ThreeDays,
    #[default]
    OneWeek,
}

impl ArchiveDuration {
    /// Map minutes to an allowed duration; unsupported values become one week
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            60 => ArchiveDuration::OneHour,
            1440 => ArchiveDuration::OneDay,
            4320 => ArchiveDuration::ThreeDays,
            _ => ArchiveDuration::OneWeek,
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            ArchiveDuration::OneHour => 60,
            ArchiveDuration::OneDay => 1440,
            ArchiveDuration::ThreeDays => 4320,
            ArchiveDuration::OneWeek => 10080,
        }
    }
}

/// Discord bot settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscordSettings {
    pub bot_token: String,
    pub channel_id: Snowflake,
    pub thread_archive: ArchiveDuration,
    pub role_ids_to_tag: Vec<Snowflake>,
}

/// Validated settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub oauth2: OAuthSettings,
    pub challonge: ChallongeSettings,
    pub discord: Option<DiscordSettings>,
    pub runner_map: RunnerMap,
    pub thread_name_template: Option<String>,
    pub message_template: Option<String>,
    pub round_label_template: Option<String>,
}

impl Settings {
    /// Role ids to tag in thread messages; empty without a Discord section
    pub fn role_ids_to_tag(&self) -> &[Snowflake] {
        self.discord
            .as_ref()
            .map(|d| d.role_ids_to_tag.as_slice())
            .unwrap_or(&[])
    }

    /// Replace the configured tournament slug
    pub fn with_tournament(mut self, tournament: Option<String>) -> Self {
        if let Some(tournament) = tournament.filter(|t| !t.trim().is_empty()) {
            self.challonge.tournament = tournament;
        }
        self
    }
}

impl RawSettings {
    /// Parse settings from YAML text. An empty document yields empty settings.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Option<Self> = serde_yaml::from_str(text)?;
        Ok(raw.unwrap_or_default())
    }

    /// Validate required keys
    ///
    /// `oauth2.client_id`, `oauth2.client_secret` and `challonge.tournament` are
    /// always required. `discord.bot_token` and `discord.channel_id` are required
    /// when `require_discord` is set, or whenever a `discord` section is present.
    pub fn validate(self, require_discord: bool) -> Result<Settings, ConfigError> {
        let oauth = self.oauth2.ok_or(ConfigError::MissingSection("oauth2"))?;
        let client_id = required(oauth.client_id, "oauth2.client_id")?;
        let client_secret = required(oauth.client_secret, "oauth2.client_secret")?;

        let challonge = self
            .challonge
            .ok_or(ConfigError::MissingSection("challonge"))?;
        let tournament = required(challonge.tournament, "challonge.tournament")?;

        let discord = match self.discord {
            Some(discord) => Some(validate_discord(discord)?),
            None if require_discord => return Err(ConfigError::MissingSection("discord")),
            None => None,
        };

        Ok(Settings {
            oauth2: OAuthSettings {
                client_id,
                client_secret,
                token_url: non_empty(oauth.token_url).unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
                scope: non_empty(oauth.scope),
                path_suffix: oauth
                    .path_suffix
                    .unwrap_or_else(|| DEFAULT_PATH_SUFFIX.to_string()),
            },
            challonge: ChallongeSettings {
                tournament,
                subdomain: non_empty(challonge.subdomain),
                base_url: non_empty(challonge.base_url)
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                page: challonge.page.unwrap_or(DEFAULT_PAGE),
                per_page: challonge.per_page.unwrap_or(DEFAULT_PER_PAGE),
                state: non_empty(challonge.state),
            },
            discord,
            runner_map: self.runner_map,
            thread_name_template: self.thread_name_template,
            message_template: self.message_template,
            round_label_template: self.round_label_template,
        })
    }
}

fn validate_discord(discord: RawDiscordSettings) -> Result<DiscordSettings, ConfigError> {
    Ok(DiscordSettings {
        bot_token: required(discord.bot_token, "discord.bot_token")?,
        channel_id: discord
            .channel_id
            .ok_or(ConfigError::MissingKey("discord.channel_id"))?,
        thread_archive: discord
            .thread_archive_minutes
            .map(ArchiveDuration::from_minutes)
            .unwrap_or_default(),
        role_ids_to_tag: discord.role_ids_to_tag,
    })
}

/// Read and validate a settings file
pub fn load_settings(path: &Path, require_discord: bool) -> Result<Settings, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    RawSettings::from_yaml_str(&text)?.validate(require_discord)
}

fn required(value: Option<String>, key: &'static str) -> Result<String, ConfigError> {
    non_empty(value).ok_or(ConfigError::MissingKey(key))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a list of ids; any other shape counts as no ids
fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<Snowflake>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(serde::de::Error::custom))
            .collect(),
        _ => Ok(Vec::new()),
    }
}
