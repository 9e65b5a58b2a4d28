//! Challonge v2.1 API client
//!
//! Imperative shell around the pure bracket parsing and stage classification
//! functions in `tourney_threads_core`.

pub mod oauth;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tourney_threads_core::bracket::{parse_bracket_page, Match};
use tourney_threads_core::config::Settings;
use tourney_threads_core::jsonapi::BracketPage;
use tourney_threads_core::participant::RunnerMap;
use tourney_threads_core::stage::{classify_stage, StageKind};

use crate::error::{body_excerpt, decode, read_response, Error};
use oauth::OAuthClient;

/// Client for one Challonge account, holding its own bearer token
#[derive(Debug)]
pub struct ChallongeClient {
    http: reqwest::Client,
    oauth: OAuthClient,
    base_url: String,
    path_suffix: String,
}

impl ChallongeClient {
    pub fn new(http: reqwest::Client, settings: &Settings) -> Self {
        Self {
            http,
            oauth: OAuthClient::new(&settings.oauth2),
            base_url: settings.challonge.base_url.trim_end_matches('/').to_string(),
            path_suffix: settings.oauth2.path_suffix.clone(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}{}", self.base_url, self.path_suffix)
    }

    /// Authenticated GET returning the parsed JSON document
    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, Error> {
        let operation = format!("GET {url}");
        let token = self.oauth.get_token(&self.http).await?;

        log::debug!(
            "GET {url} params={query:?} headers={{Authorization: Bearer …, Authorization-Type: v2}}"
        );

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header("Authorization-Type", "v2")
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/vnd.api+json")
            .query(query)
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

        decode(&body, &operation)
    }

    /// Fetch one page of matches, with participants in `included`
    pub async fn fetch_bracket_page(
        &self,
        tournament_slug: &str,
        page: u32,
        per_page: u32,
        state_filter: Option<&str>,
    ) -> Result<BracketPage, Error> {
        let url = self.url(&format!("/tournaments/{tournament_slug}/matches"));

        let mut query = vec![("page", page.to_string()), ("per_page", per_page.to_string())];
        if let Some(state) = state_filter {
            query.push(("state", state.to_string()));
        }

        let document = self.get_json(&url, &query).await?;
        log::debug!(
            "{}",
            serde_json::to_string_pretty(&document).unwrap_or_default()
        );

        serde_json::from_value(document).map_err(|source| Error::Decode {
            operation: format!("GET {url}"),
            source,
        })
    }

    /// Fetch the tournament document used for stage classification
    pub async fn fetch_tournament_metadata(&self, tournament_slug: &str) -> Result<Value, Error> {
        let url = self.url(&format!("/tournaments/{tournament_slug}"));
        self.get_json(&url, &[]).await
    }

    /// Fetch and parse the configured page of matches
    pub async fn fetch_matches(&self, settings: &Settings) -> Result<Vec<Match>, Error> {
        let challonge = &settings.challonge;
        let page = self
            .fetch_bracket_page(
                &challonge.api_slug(),
                challonge.page,
                challonge.per_page,
                challonge.state.as_deref(),
            )
            .await?;

        Ok(matches_from_page(&page, &settings.runner_map))
    }

    /// Classify the tournament stage; any failure degrades to `None`
    pub async fn probe_stage_kind(&self, tournament_slug: &str) -> Option<StageKind> {
        match self.fetch_tournament_metadata(tournament_slug).await {
            Ok(document) => {
                let stage = classify_stage(&document);
                log::debug!("tournament stage probe: {stage:?}");
                stage
            }
            Err(err) => {
                log::warn!("tournament stage probe failed: {err}");
                None
            }
        }
    }
}

fn matches_from_page(page: &BracketPage, runner_map: &RunnerMap) -> Vec<Match> {
    let matches = parse_bracket_page(page, runner_map);
    log::debug!(
        "parsed {} match(es) and {} included resource(s)",
        matches.len(),
        page.included.len()
    );
    matches
}
