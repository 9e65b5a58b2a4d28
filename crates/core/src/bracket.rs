//! Bracket page parsing
//!
//! Converts the `data` (matches) and `included` (participants) sections of a
//! `GET /tournaments/{slug}/matches` page into typed [`Match`] entities.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::jsonapi::{BracketPage, Resource};
use crate::participant::{resolve_participant, Participant, RunnerMap};
use crate::rounds::coerce_round;

/// Name and mention shown for an undetermined bracket slot
pub const TBD: &str = "TBD";

/// A tournament match with its (possibly undetermined) opponents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub match_id: String,
    /// Challonge match state ("open", "pending", "complete"...)
    pub state: String,
    /// Positive for the winners bracket, negative for the losers bracket
    pub round: i64,
    pub player1: Option<Participant>,
    pub player2: Option<Participant>,
}

impl Match {
    pub fn p1_name(&self) -> &str {
        self.player1.as_ref().map_or(TBD, |p| p.username.as_str())
    }

    pub fn p2_name(&self) -> &str {
        self.player2.as_ref().map_or(TBD, |p| p.username.as_str())
    }

    pub fn p1_mention(&self) -> &str {
        self.player1.as_ref().map_or(TBD, |p| p.mention.as_str())
    }

    pub fn p2_mention(&self) -> &str {
        self.player2.as_ref().map_or(TBD, |p| p.mention.as_str())
    }

    pub fn p1_id(&self) -> Option<&str> {
        self.player1.as_ref().map(|p| p.id.as_str())
    }

    pub fn p2_id(&self) -> Option<&str> {
        self.player2.as_ref().map(|p| p.id.as_str())
    }
}

/// Index participant resources from `included` by id
///
/// Resources of any other type, and participants without an id, are skipped.
pub fn index_participants(included: &[Resource]) -> HashMap<String, &Resource> {
    included
        .iter()
        .filter(|resource| resource.is_participant())
        .filter_map(|resource| {
            resource
                .id
                .as_ref()
                .map(|id| (id.as_str().to_string(), resource))
        })
        .collect()
}

/// Parse raw match resources into [`Match`] entities, preserving input order
///
/// An opponent whose relationship has no id, or whose id is not among the
/// included participants, is left as `None` (TBD).
pub fn parse_matches(matches: &[Resource], included: &[Resource], runner_map: &RunnerMap) -> Vec<Match> {
    let participants = index_participants(included);

    matches
        .iter()
        .map(|resource| parse_match(resource, &participants, runner_map))
        .collect()
}

/// Parse every match of a bracket page
pub fn parse_bracket_page(page: &BracketPage, runner_map: &RunnerMap) -> Vec<Match> {
    parse_matches(&page.data, &page.included, runner_map)
}

fn parse_match(
    resource: &Resource,
    participants: &HashMap<String, &Resource>,
    runner_map: &RunnerMap,
) -> Match {
    let match_id = resource
        .id
        .as_ref()
        .map(|id| id.as_str().to_string())
        .unwrap_or_default();
    let state = resource
        .attribute("state")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let round = resource.attribute("round").map(coerce_round).unwrap_or(0);

    let opponent = |relationship: &str| {
        let id = resource.related_id(relationship)?;
        let record = participants.get(&id).copied();
        resolve_participant(&id, record, runner_map)
    };

    Match {
        match_id,
        state,
        round,
        player1: opponent("player1"),
        player2: opponent("player2"),
    }
}
