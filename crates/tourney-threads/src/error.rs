use tourney_threads_core::config::ConfigError;
use tourney_threads_core::participant::Snowflake;
use tourney_threads_core::template::TemplateError;

/// Longest response body excerpt carried by an error, in characters
pub const BODY_EXCERPT_LEN: usize = 500;

#[derive(thiserror::Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    /// Challonge or the OAuth endpoint answered with a non-success status
    #[error("{operation} failed ({status}): {body}")]
    Fetch {
        operation: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("OAuth token response missing access_token")]
    Auth,

    /// Discord answered with a non-success status
    #[error("Discord {operation} failed ({status}): {body}")]
    Discord {
        operation: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{operation} failed: {source}")]
    Http {
        operation: String,
        source: reqwest::Error,
    },

    #[error("failed to parse response from {operation}: {source}")]
    Decode {
        operation: String,
        source: serde_json::Error,
    },

    #[error("channel_id {0} does not refer to a text channel")]
    NotTextChannel(Snowflake),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// First [`BODY_EXCERPT_LEN`] characters of a response body
pub fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

/// Read a response body, returning its status alongside it
pub async fn read_response(
    response: reqwest::Response,
    operation: &str,
) -> Result<(reqwest::StatusCode, String), Error> {
    let status = response.status();
    let body = response.text().await.map_err(|source| Error::Http {
        operation: operation.to_string(),
        source,
    })?;
    Ok((status, body))
}

pub fn decode<T: serde::de::DeserializeOwned>(body: &str, operation: &str) -> Result<T, Error> {
    serde_json::from_str(body).map_err(|source| Error::Decode {
        operation: operation.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_excerpt_truncates_long_bodies() {
        let body = "x".repeat(2_000);
        assert_eq!(body_excerpt(&body).chars().count(), BODY_EXCERPT_LEN);
    }

    #[test]
    fn test_body_excerpt_keeps_short_bodies() {
        assert_eq!(body_excerpt("not found"), "not found");
    }

    #[test]
    fn test_fetch_error_message_names_operation() {
        let err = Error::Fetch {
            operation: "GET https://api.challonge.com/v2.1/tournaments/cup/matches.json".to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
            body: body_excerpt("{\"errors\":[\"not found\"]}"),
        };

        let message = err.to_string();
        assert!(message.starts_with("GET https://api.challonge.com/v2.1/tournaments/cup/matches.json failed (404 Not Found)"));
        assert!(message.contains("not found"));
    }

    #[test]
    fn test_decode_error() {
        let err = decode::<serde_json::Value>("<html>", "GET /x").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }
}
