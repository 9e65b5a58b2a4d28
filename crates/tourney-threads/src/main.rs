use crate::prelude::*;
use crate::prelude::println;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use tourney_threads_core::bracket::Match;
use tourney_threads_core::config::{load_settings, Settings};
use tourney_threads_core::stage::StageKind;

use crate::challonge::ChallongeClient;
use crate::discord::DiscordClient;
use crate::threads::{create_threads, ThreadTarget};

mod challonge;
mod discord;
mod error;
mod prelude;
mod preview;
mod threads;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Create one Discord scheduling thread per Challonge match"
)]
pub struct App {
    /// Path to the YAML configuration file
    #[clap(long, env = "TOURNEY_THREADS_CONFIG", default_value = "config.yaml")]
    config: PathBuf,

    /// Tournament identifier, overriding `challonge.tournament`
    #[clap(long, env = "TOURNEY_THREADS_TOURNAMENT")]
    tournament: Option<String>,

    /// Print the raw API responses and a per-match summary table
    #[clap(long, default_value = "false")]
    debug: bool,

    /// Print the threads that would be created without touching Discord
    #[clap(long, default_value = "false")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let app = App::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if app.debug {
        "debug"
    } else {
        "warn"
    }))
    .init();
    color_eyre::install()?;

    run(app).await
}

async fn run(app: App) -> Result<()> {
    let settings = load_settings(&app.config, !app.dry_run)
        .wrap_err_with(|| f!("Failed to load configuration from {}", app.config.display()))?
        .with_tournament(app.tournament);

    log::info!(
        "fetching matches for tournament {}",
        settings.challonge.api_slug()
    );

    let challonge = ChallongeClient::new(reqwest::Client::new(), &settings);
    let matches = challonge
        .fetch_matches(&settings)
        .await
        .wrap_err("Failed to fetch matches from Challonge")?;
    let stage = challonge
        .probe_stage_kind(&settings.challonge.api_slug())
        .await;

    if app.debug {
        preview::print_debug_summary(&matches, stage, &settings);
    }

    if app.dry_run {
        return preview::print_dry_run(&matches, stage, &settings);
    }

    publish(&matches, stage, &settings).await
}

async fn publish(
    matches: &[Match],
    stage: Option<StageKind>,
    settings: &Settings,
) -> Result<()> {
    let discord = settings
        .discord
        .as_ref()
        .ok_or_eyre("The `discord` section is required unless --dry-run is set")?;

    let client = DiscordClient::new(&discord.bot_token)?;
    client
        .ensure_text_channel(discord.channel_id)
        .await
        .wrap_err_with(|| f!("Channel {} is not usable for threads", discord.channel_id))?;

    let target = ThreadTarget {
        channel: discord.channel_id,
        archive: discord.thread_archive,
    };
    let report = create_threads(&client, target, matches, stage, settings).await;

    println!(
        "\n{} {} created, {} failed",
        "Done:".bold(),
        report.created,
        report.failures.len()
    );

    Ok(())
}
