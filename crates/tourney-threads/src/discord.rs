//! Discord REST client for match threads

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::Deserialize;
use tourney_threads_core::config::ArchiveDuration;
use tourney_threads_core::participant::Snowflake;

use crate::error::{body_excerpt, decode, read_response, Error};
use crate::prelude::{eyre, Result};

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Channel type of a guild text channel
const GUILD_TEXT: u8 = 0;
/// Channel type of a public thread
const PUBLIC_THREAD: u8 = 11;

/// A created thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadHandle {
    pub id: Snowflake,
    pub name: String,
}

/// Destination for match threads
#[allow(async_fn_in_trait)]
pub trait ThreadSink {
    /// Create a public thread named `name` under `channel`
    async fn create_thread(
        &self,
        channel: Snowflake,
        name: &str,
        archive: ArchiveDuration,
    ) -> Result<ThreadHandle, Error>;

    /// Post `content` into `thread`
    async fn send_message(&self, thread: &ThreadHandle, content: &str) -> Result<(), Error>;
}

#[derive(Debug, Deserialize)]
struct ChannelResponse {
    id: Snowflake,
    #[serde(rename = "type")]
    kind: u8,
    #[serde(default)]
    name: Option<String>,
}

/// Create an HTTP client carrying the bot's Authorization header
pub fn create_discord_client(bot_token: &str) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bot {bot_token}"))
            .map_err(|e| eyre!("Invalid header value: {}", e))?,
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!(
            "DiscordBot (https://github.com/tourney-threads/tourney-threads, ",
            env!("CARGO_PKG_VERSION"),
            ")"
        )),
    );

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| eyre!("Failed to build HTTP client: {}", e))
}

#[derive(Debug)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new(bot_token: &str) -> Result<Self> {
        Ok(Self {
            http: create_discord_client(bot_token)?,
            base_url: DISCORD_API_BASE.to_string(),
        })
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        payload: &serde_json::Value,
        operation: &str,
    ) -> Result<T, Error> {
        let url = format!("{}{path}", self.base_url);
        log::debug!("POST {url}");

        let response = self
            .http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|source| Error::Http {
                operation: format!("Discord {operation}"),
                source,
            })?;

        let (status, body) = read_response(response, operation).await?;
        if !status.is_success() {
            return Err(Error::Discord {
                operation: operation.to_string(),
                status,
                body: body_excerpt(&body),
            });
        }

        decode(&body, operation)
    }

    /// Fail unless `channel` is a guild text channel
    pub async fn ensure_text_channel(&self, channel: Snowflake) -> Result<(), Error> {
        let operation = "fetch channel";
        let url = format!("{}/channels/{channel}", self.base_url);
        log::debug!("GET {url}");

        let response = self.http.get(&url).send().await.map_err(|source| Error::Http {
            operation: format!("Discord {operation}"),
            source,
        })?;

        let (status, body) = read_response(response, operation).await?;
        if !status.is_success() {
            return Err(Error::Discord {
                operation: operation.to_string(),
                status,
                body: body_excerpt(&body),
            });
        }

        let channel_info: ChannelResponse = decode(&body, operation)?;
        if channel_info.kind != GUILD_TEXT {
            return Err(Error::NotTextChannel(channel));
        }

        Ok(())
    }
}

impl ThreadSink for DiscordClient {
    async fn create_thread(
        &self,
        channel: Snowflake,
        name: &str,
        archive: ArchiveDuration,
    ) -> Result<ThreadHandle, Error> {
        let payload = serde_json::json!({
            "name": name,
            "auto_archive_duration": archive.minutes(),
            "type": PUBLIC_THREAD,
        });

        let created: ChannelResponse = self
            .post(&format!("/channels/{channel}/threads"), &payload, "create thread")
            .await?;

        Ok(ThreadHandle {
            id: created.id,
            name: created.name.unwrap_or_else(|| name.to_string()),
        })
    }

    async fn send_message(&self, thread: &ThreadHandle, content: &str) -> Result<(), Error> {
        let payload = serde_json::json!({
            "content": content,
            "allowed_mentions": { "parse": ["users", "roles"] },
        });

        let _: serde_json::Value = self
            .post(&format!("/channels/{}/messages", thread.id), &payload, "send message")
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_response_parses_string_ids() {
        let channel: ChannelResponse =
            serde_json::from_str(r#"{"id":"123456789012345678","type":11,"name":"Winners R1"}"#)
                .unwrap();

        assert_eq!(channel.id, Snowflake(123456789012345678));
        assert_eq!(channel.kind, PUBLIC_THREAD);
        assert_eq!(channel.name.as_deref(), Some("Winners R1"));
    }

    #[test]
    fn test_create_discord_client_rejects_invalid_token() {
        assert!(create_discord_client("bad\ntoken").is_err());
        assert!(create_discord_client("good-token").is_ok());
    }
}
