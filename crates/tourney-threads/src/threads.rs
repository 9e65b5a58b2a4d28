//! Per-match thread creation
//!
//! One thread per match, in bracket order. A failure for one match is reported
//! and recorded, and the loop moves on to the next match.

use colored::Colorize;
use tourney_threads_core::bracket::Match;
use tourney_threads_core::config::{ArchiveDuration, Settings};
use tourney_threads_core::participant::{build_role_mentions, Snowflake};
use tourney_threads_core::render::{render_body, render_title, truncate_title};
use tourney_threads_core::stage::StageKind;

use crate::discord::ThreadSink;
use crate::error::Error;
use crate::prelude::{eprintln, println};

/// A match whose thread could not be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadFailure {
    pub match_id: String,
    pub error: String,
}

/// Outcome of a thread creation pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadReport {
    pub created: usize,
    pub failures: Vec<ThreadFailure>,
}

/// Where and how threads are created
#[derive(Debug, Clone, Copy)]
pub struct ThreadTarget {
    pub channel: Snowflake,
    pub archive: ArchiveDuration,
}

/// Create a thread and its opening message for every match
pub async fn create_threads<S: ThreadSink>(
    sink: &S,
    target: ThreadTarget,
    matches: &[Match],
    stage: Option<StageKind>,
    settings: &Settings,
) -> ThreadReport {
    let mut report = ThreadReport::default();

    if matches.is_empty() {
        println!("[info] No matches to create threads for.");
        return report;
    }

    let role_mentions = build_role_mentions(settings.role_ids_to_tag());

    for m in matches {
        match create_match_thread(sink, target, m, stage, settings, &role_mentions).await {
            Ok(title) => {
                println!("{} {}", "Created thread:".green(), title);
                report.created += 1;
            }
            Err(err) => {
                log::warn!("thread creation failed for match {}: {err}", m.match_id);
                eprintln!(
                    "{} {}: {}",
                    "Error creating thread for match".red(),
                    m.match_id,
                    err
                );
                report.failures.push(ThreadFailure {
                    match_id: m.match_id.clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    if report.created == 0 {
        println!("[info] No threads created.");
    }

    report
}

/// Render, create and post one match thread, returning the title used
async fn create_match_thread<S: ThreadSink>(
    sink: &S,
    target: ThreadTarget,
    m: &Match,
    stage: Option<StageKind>,
    settings: &Settings,
    role_mentions: &str,
) -> Result<String, Error> {
    let title = truncate_title(&render_title(m, stage, settings, role_mentions)?);
    let body = render_body(m, stage, settings, role_mentions)?;

    let thread = sink
        .create_thread(target.channel, &title, target.archive)
        .await?;
    sink.send_message(&thread, &body).await?;

    Ok(title)
}
