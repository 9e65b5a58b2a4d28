//! Dry-run previews and debug summaries

use colored::Colorize;
use tourney_threads_core::bracket::Match;
use tourney_threads_core::config::Settings;
use tourney_threads_core::participant::build_role_mentions;
use tourney_threads_core::render::{render_body, render_title, truncate_title};
use tourney_threads_core::rounds::round_label;
use tourney_threads_core::stage::StageKind;
use tourney_threads_core::template::TemplateError;

use crate::prelude::{new_table, println, Result};

/// Text of the dry-run preview: every thread title and opening message
pub fn dry_run_preview(
    matches: &[Match],
    stage: Option<StageKind>,
    settings: &Settings,
) -> Result<String, TemplateError> {
    if matches.is_empty() {
        return Ok("=== DRY RUN ===\n(No matches to show)\n=== END DRY RUN ===".to_string());
    }

    let role_mentions = build_role_mentions(settings.role_ids_to_tag());
    let mut output = String::from("=== DRY RUN: Discord threads preview ===\n");

    for m in matches {
        let title = truncate_title(&render_title(m, stage, settings, &role_mentions)?);
        let body = render_body(m, stage, settings, &role_mentions)?;
        output.push_str(&format!("\nTHREAD: {title}\nMESSAGE:\n{body}\n\n"));
    }

    output.push_str("=== END DRY RUN ===");
    Ok(output)
}

pub fn print_dry_run(matches: &[Match], stage: Option<StageKind>, settings: &Settings) -> Result<()> {
    println!("{}", dry_run_preview(matches, stage, settings)?);
    Ok(())
}

/// Table with one row per match: ids, state, round and label, and both opponents
pub fn debug_summary_table(
    matches: &[Match],
    stage: Option<StageKind>,
    settings: &Settings,
) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Match", "State", "Round", "Label", "P1 id", "P1 username", "P1 mention", "P2 id",
        "P2 username", "P2 mention"
    ]);

    for m in matches {
        let label = round_label(m.round, stage, settings.round_label_template.as_deref());
        table.add_row(prettytable::row![
            m.match_id,
            m.state,
            m.round,
            label,
            m.p1_id().unwrap_or("-"),
            m.p1_name(),
            m.p1_mention(),
            m.p2_id().unwrap_or("-"),
            m.p2_name(),
            m.p2_mention()
        ]);
    }

    table
}

pub fn print_debug_summary(matches: &[Match], stage: Option<StageKind>, settings: &Settings) {
    if matches.is_empty() {
        println!("\n(No matches returned)");
        return;
    }

    let stage_text = stage.map(|s| s.to_string()).unwrap_or_else(|| "unknown".to_string());
    println!("\n{} (stage: {})", "=== Matches Summary ===".bold().cyan(), stage_text);
    debug_summary_table(matches, stage, settings).printstd();
}
