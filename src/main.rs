use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nba_highlights::config::Settings;
use nba_highlights::download::ClipStatus;
use nba_highlights::highlight::Highlight;
use nba_highlights::pipeline::{self, HighlightRequest};

/// Cut one player's highlights from a game into a single video.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Game date in format of YYYY-MM-DD
    #[arg(long = "game_date", value_parser = parse_game_date)]
    game_date: NaiveDate,

    /// Full name of the player
    #[arg(long = "player_name")]
    player_name: String,

    /// Which events to cut
    #[arg(long = "target_highlight", value_enum)]
    target_highlight: Highlight,

    /// Folder for the downloaded clips, created if missing
    #[arg(long = "target_folder", default_value = "videos")]
    target_folder: PathBuf,

    /// File name stem for the numbered clips
    #[arg(long = "video_prefix", default_value = "clip")]
    video_prefix: String,

    /// Name of the final video, without extension
    #[arg(long = "output_video_name", default_value = "output")]
    output_video_name: String,

    /// Find the game through this team's schedule instead of the player's
    #[arg(long = "team_name")]
    team_name: Option<String>,

    /// Build the video from the clips that did download when some failed
    #[arg(long = "allow_partial")]
    allow_partial: bool,

    /// Replace an existing output video
    #[arg(long = "overwrite")]
    overwrite: bool,
}

fn parse_game_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn main() -> ExitCode {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let settings = Settings::from_env();
    let request = HighlightRequest {
        game_date: args.game_date,
        player_name: args.player_name,
        team_name: args.team_name,
        highlight: args.target_highlight,
        target_folder: args.target_folder,
        video_prefix: args.video_prefix,
        output_video_name: args.output_video_name,
        allow_partial: args.allow_partial,
        overwrite: args.overwrite,
    };

    let summary = pipeline::run(&settings, &request).context("highlight run failed")?;

    println!("Highlight video complete");
    println!("Player id: {}", summary.player_id);
    println!("Game id: {}", summary.game_id);
    println!(
        "Clips: {}/{}",
        summary.report.saved_paths().len(),
        summary.selected
    );
    let failures = summary.report.failures();
    if !failures.is_empty() {
        println!("Failed clips: {}", failures.len());
        for item in failures.iter().take(8) {
            if let ClipStatus::Failed(reason) = &item.status {
                println!(" - #{} (event {}): {reason}", item.position, item.event_num);
            }
        }
    }
    println!("Manifest: {}", summary.manifest.display());
    println!("Output: {}", summary.output.display());
    Ok(())
}
