//! OAuth2 client-credentials flow for the Challonge API

use serde_json::Value;
use tokio::sync::OnceCell;
use tourney_threads_core::config::OAuthSettings;

use crate::error::{body_excerpt, decode, read_response, Error};

/// Obtains and caches one bearer token
///
/// The token is requested on first use and kept for the lifetime of the client;
/// expiry is not tracked. Build a new client to get a fresh token.
#[derive(Debug)]
pub struct OAuthClient {
    token_url: String,
    client_id: String,
    client_secret: String,
    scope: Option<String>,
    token: OnceCell<String>,
}

impl OAuthClient {
    pub fn new(settings: &OAuthSettings) -> Self {
        Self {
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            scope: settings.scope.clone(),
            token: OnceCell::new(),
        }
    }

    /// Return the cached token, requesting one if needed
    pub async fn get_token(&self, http: &reqwest::Client) -> Result<&str, Error> {
        self.token
            .get_or_try_init(|| self.request_token(http))
            .await
            .map(String::as_str)
    }

    async fn request_token(&self, http: &reqwest::Client) -> Result<String, Error> {
        let operation = format!("OAuth token request to {}", self.token_url);

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        if let Some(scope) = &self.scope {
            form.push(("scope", scope.as_str()));
        }

        log::debug!("POST {} (client_credentials)", self.token_url);

        let response = http
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|source| Error::Http {
                operation: operation.clone(),
                source,
            })?;

        let (status, body) = read_response(response, &operation).await?;
        if !status.is_success() {
            return Err(Error::Fetch {
                operation,
                status,
                body: body_excerpt(&body),
            });
        }

        let payload: Value = decode(&body, &operation)?;
        extract_access_token(&payload)
    }
}

/// Pull a non-empty `access_token` string out of a token response
pub fn extract_access_token(payload: &Value) -> Result<String, Error> {
    payload
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(Error::Auth)
}
