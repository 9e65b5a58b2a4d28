//! Thread title and body rendering
//!
//! Every template (built-in or from the settings file) sees the same variables:
//! `round_label`, `p1_name`, `p2_name`, `p1_mention`, `p2_mention`,
//! `role_mentions`, `match_id`, `match_state`, `tournament_name`, `match_url`,
//! `stage`, `bracket`, `round` and `abs_round`.

use serde::Serialize;

use crate::bracket::Match;
use crate::config::Settings;
use crate::rounds::{round_label, Bracket};
use crate::stage::{stage_name, StageKind};
use crate::template::{render_template, TemplateError, TemplateVars};

pub const DEFAULT_THREAD_NAME_TEMPLATE: &str = "{round_label}: {p1_name} vs {p2_name}";
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "Hi {p1_mention} vs {p2_mention}! {role_mentions}\nThis is your scheduling thread for {round_label}.";

/// Discord's limit on thread names, in characters
pub const MAX_THREAD_NAME_LENGTH: usize = 100;

/// Public match page on Challonge
pub fn match_url(tournament: &str, subdomain: Option<&str>, match_id: &str) -> String {
    match subdomain {
        Some(subdomain) if !subdomain.is_empty() => {
            format!("https://{subdomain}.challonge.com/{tournament}/matches/{match_id}")
        }
        _ => format!("https://challonge.com/{tournament}/matches/{match_id}"),
    }
}

/// The variables available to thread templates for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    pub round_label: String,
    pub p1_name: String,
    pub p2_name: String,
    pub p1_mention: String,
    pub p2_mention: String,
    pub role_mentions: String,
    pub match_id: String,
    pub match_state: String,
    pub tournament_name: String,
    pub match_url: String,
    pub stage: String,
    pub bracket: Bracket,
    pub round: i64,
    pub abs_round: i64,
}

impl RenderContext {
    pub fn new(
        m: &Match,
        stage: Option<StageKind>,
        settings: &Settings,
        role_mentions: &str,
    ) -> Self {
        let tournament = settings.challonge.tournament.as_str();

        Self {
            round_label: round_label(m.round, stage, settings.round_label_template.as_deref()),
            p1_name: m.p1_name().to_string(),
            p2_name: m.p2_name().to_string(),
            p1_mention: m.p1_mention().to_string(),
            p2_mention: m.p2_mention().to_string(),
            role_mentions: role_mentions.to_string(),
            match_id: m.match_id.clone(),
            match_state: m.state.clone(),
            tournament_name: tournament.to_string(),
            match_url: match_url(
                tournament,
                settings.challonge.subdomain.as_deref(),
                &m.match_id,
            ),
            stage: stage_name(stage).to_string(),
            bracket: Bracket::from_round(m.round),
            round: m.round,
            abs_round: m.round.saturating_abs(),
        }
    }

    pub fn vars(&self) -> TemplateVars {
        TemplateVars::new()
            .with("round_label", self.round_label.as_str())
            .with("p1_name", self.p1_name.as_str())
            .with("p2_name", self.p2_name.as_str())
            .with("p1_mention", self.p1_mention.as_str())
            .with("p2_mention", self.p2_mention.as_str())
            .with("role_mentions", self.role_mentions.as_str())
            .with("match_id", self.match_id.as_str())
            .with("match_state", self.match_state.as_str())
            .with("tournament_name", self.tournament_name.as_str())
            .with("match_url", self.match_url.as_str())
            .with("stage", self.stage.as_str())
            .with("bracket", self.bracket.as_str())
            .with("round", self.round)
            .with("abs_round", self.abs_round)
    }
}

/// Render the thread title for a match (not yet truncated)
pub fn render_title(
    m: &Match,
    stage: Option<StageKind>,
    settings: &Settings,
    role_mentions: &str,
) -> Result<String, TemplateError> {
    let template = settings
        .thread_name_template
        .as_deref()
        .unwrap_or(DEFAULT_THREAD_NAME_TEMPLATE);
    render_template(template, &RenderContext::new(m, stage, settings, role_mentions).vars())
}

/// Render the first message posted in a match thread
pub fn render_body(
    m: &Match,
    stage: Option<StageKind>,
    settings: &Settings,
    role_mentions: &str,
) -> Result<String, TemplateError> {
    let template = settings
        .message_template
        .as_deref()
        .unwrap_or(DEFAULT_MESSAGE_TEMPLATE);
    render_template(template, &RenderContext::new(m, stage, settings, role_mentions).vars())
}

/// Cut a title down to [`MAX_THREAD_NAME_LENGTH`] characters
pub fn truncate_title(title: &str) -> String {
    title.chars().take(MAX_THREAD_NAME_LENGTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bracket::parse_matches;
    use crate::config::RawSettings;
    use crate::jsonapi::BracketPage;
    use crate::participant::{build_role_mentions, Participant, Snowflake};
    use serde_json::json;

    fn settings(extra: &str) -> Settings {
        let text = format!(
            "oauth2:\n  client_id: id\n  client_secret: secret\nchallonge:\n  tournament: spring-cup\n{extra}"
        );
        RawSettings::from_yaml_str(&text)
            .unwrap()
            .validate(false)
            .unwrap()
    }

    fn player(id: &str, name: &str, mention: &str) -> Participant {
        Participant {
            id: id.to_string(),
            username: name.to_string(),
            raw_name: name.to_string(),
            mention: mention.to_string(),
        }
    }

    fn alice_vs_bob(round: i64) -> Match {
        Match {
            match_id: "1".to_string(),
            state: "open".to_string(),
            round,
            player1: Some(player("p1", "Alice", "Alice")),
            player2: Some(player("p2", "Bob", "Bob")),
        }
    }

    fn page_alice_vs_bob(round: i64) -> BracketPage {
        serde_json::from_value(json!({
            "data": [{
                "id": "1",
                "type": "match",
                "attributes": { "state": "open", "round": round },
                "relationships": {
                    "player1": { "data": { "id": "p1", "type": "participant" } },
                    "player2": { "data": { "id": "p2", "type": "participant" } }
                }
            }],
            "included": [
                { "id": "p1", "type": "participant", "attributes": { "name": "Alice" } },
                { "id": "p2", "type": "participant", "attributes": { "name": "Bob" } }
            ]
        }))
        .unwrap()
    }

    // ============================================================================
    // End-to-end scenarios
    // ============================================================================

    #[test]
    fn test_scenario_winners_title() {
        let settings = settings("");
        let page = page_alice_vs_bob(1);
        let matches = parse_matches(&page.data, &page.included, &settings.runner_map);

        let title = render_title(&matches[0], Some(StageKind::Elimination), &settings, "").unwrap();

        assert_eq!(title, "Winners R1: Alice vs Bob");
    }

    #[test]
    fn test_scenario_losers_label() {
        let settings = settings("");
        let page = page_alice_vs_bob(-2);
        let matches = parse_matches(&page.data, &page.included, &settings.runner_map);

        let context = RenderContext::new(&matches[0], Some(StageKind::Elimination), &settings, "");
        let title = render_title(&matches[0], Some(StageKind::Elimination), &settings, "").unwrap();

        assert_eq!(context.round_label, "Losers R2");
        assert_eq!(title, "Losers R2: Alice vs Bob");
    }

    #[test]
    fn test_scenario_swiss_tbd() {
        let settings = settings("");
        let m = Match {
            match_id: "9".to_string(),
            state: "pending".to_string(),
            round: 0,
            player1: None,
            player2: None,
        };

        let context = RenderContext::new(&m, Some(StageKind::Swiss), &settings, "");
        let title = render_title(&m, Some(StageKind::Swiss), &settings, "").unwrap();

        assert_eq!(context.round_label, "Swiss R1");
        assert_eq!(title, "Swiss R1: TBD vs TBD");
    }

    #[test]
    fn test_scenario_body_mentions() {
        let settings = settings("runner_map:\n  Alice: 100\n");
        let page = page_alice_vs_bob(1);
        let matches = parse_matches(&page.data, &page.included, &settings.runner_map);

        let body = render_body(&matches[0], Some(StageKind::Elimination), &settings, "").unwrap();

        assert!(body.contains("<@100>"));
        assert!(body.contains("Bob"));
        assert!(!body.contains("<@100> vs <@"));
        assert_eq!(
            body,
            "Hi <@100> vs Bob! \nThis is your scheduling thread for Winners R1."
        );
    }

    #[test]
    fn test_default_body_with_role_mentions() {
        let settings = settings("");
        let roles = build_role_mentions(&[Snowflake(7), Snowflake(8)]);

        let body = render_body(&alice_vs_bob(3), None, &settings, &roles).unwrap();

        assert_eq!(
            body,
            "Hi Alice vs Bob! <@&7> <@&8>\nThis is your scheduling thread for Winners R3."
        );
    }

    // ============================================================================
    // Custom templates
    // ============================================================================

    #[test]
    fn test_custom_templates_see_every_variable() {
        let template = "{round_label}|{p1_name}|{p2_name}|{p1_mention}|{p2_mention}|{role_mentions}|{match_id}|{match_state}|{tournament_name}|{match_url}|{stage}|{bracket}|{round}|{abs_round}";
        let settings = settings(&format!(
            "thread_name_template: \"{template}\"\nmessage_template: \"{template}\"\n"
        ));
        let m = alice_vs_bob(-3);

        let expected = "Losers R3|Alice|Bob|Alice|Bob|<@&1>|1|open|spring-cup|https://challonge.com/spring-cup/matches/1|Elimination|Losers|-3|3";

        assert_eq!(
            render_title(&m, Some(StageKind::Elimination), &settings, "<@&1>").unwrap(),
            expected
        );
        assert_eq!(
            render_body(&m, Some(StageKind::Elimination), &settings, "<@&1>").unwrap(),
            expected
        );
    }

    #[test]
    fn test_round_label_template_flows_into_title() {
        let settings = settings("round_label_template: \"{stage} {bracket} #{abs_round}\"\n");

        let title = render_title(&alice_vs_bob(-1), Some(StageKind::Elimination), &settings, "")
            .unwrap();

        assert_eq!(title, "Elimination Losers #1: Alice vs Bob");
    }

    #[test]
    fn test_broken_round_label_template_falls_back() {
        let settings = settings("round_label_template: \"{nope}\"\n");

        let title = render_title(&alice_vs_bob(2), None, &settings, "").unwrap();

        assert_eq!(title, "Winners R2: Alice vs Bob");
    }

    #[test]
    fn test_unknown_stage_renders_empty() {
        let settings = settings("thread_name_template: \"[{stage}] {round_label}\"\n");

        let title = render_title(&alice_vs_bob(2), None, &settings, "").unwrap();

        assert_eq!(title, "[] Winners R2");
    }

    #[test]
    fn test_broken_title_template_is_an_error() {
        let settings = settings("thread_name_template: \"{p3_name}\"\n");

        let err = render_title(&alice_vs_bob(1), None, &settings, "").unwrap_err();

        assert_eq!(err, TemplateError::UnknownVariable("p3_name".to_string()));
    }

    // ============================================================================
    // match_url and truncation
    // ============================================================================

    #[test]
    fn test_match_url() {
        assert_eq!(
            match_url("cup", None, "42"),
            "https://challonge.com/cup/matches/42"
        );
        assert_eq!(
            match_url("cup", Some("myorg"), "42"),
            "https://myorg.challonge.com/cup/matches/42"
        );
        assert_eq!(
            match_url("cup", Some(""), "42"),
            "https://challonge.com/cup/matches/42"
        );
    }

    #[test]
    fn test_match_url_uses_configured_subdomain() {
        let mut settings = settings("");
        settings.challonge.subdomain = Some("myorg".to_string());

        let context = RenderContext::new(&alice_vs_bob(1), None, &settings, "");

        assert_eq!(
            context.match_url,
            "https://myorg.challonge.com/spring-cup/matches/1"
        );
    }

    #[test]
    fn test_truncate_title() {
        let long = "x".repeat(150);
        assert_eq!(truncate_title(&long).chars().count(), MAX_THREAD_NAME_LENGTH);

        let exact = "y".repeat(100);
        assert_eq!(truncate_title(&exact), exact);

        assert_eq!(truncate_title("short"), "short");
    }

    #[test]
    fn test_truncate_title_counts_characters() {
        let long = "é".repeat(120);
        let truncated = truncate_title(&long);

        assert_eq!(truncated.chars().count(), MAX_THREAD_NAME_LENGTH);
        assert_eq!(truncated, "é".repeat(100));
    }

    #[test]
    fn test_long_rendered_title_truncates_to_limit() {
        let m = Match {
            player1: Some(player("p1", &"A".repeat(80), "A")),
            player2: Some(player("p2", &"B".repeat(80), "B")),
            ..alice_vs_bob(1)
        };

        let title = render_title(&m, None, &settings(""), "").unwrap();
        let truncated = truncate_title(&title);

        assert!(title.chars().count() > MAX_THREAD_NAME_LENGTH);
        assert_eq!(truncated.chars().count(), MAX_THREAD_NAME_LENGTH);
        assert!(truncated.starts_with("Winners R1: AAAA"));
    }
}
