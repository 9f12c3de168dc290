use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::Settings;
use crate::download::{ClipLayout, ClipSource, DownloadReport, download_clips};
use crate::error::HighlightError;
use crate::events::GameEvent;
use crate::games::{GameFinderQuery, GameRow, games_on_date, single_game};
use crate::highlight::Highlight;
use crate::identity::{Directory, season_for_date};
use crate::mux::{ConcatCommand, output_file_name, write_manifest};
use crate::stats_api::StatsClient;

#[derive(Debug, Clone)]
pub struct HighlightRequest {
    pub game_date: NaiveDate,
    pub player_name: String,
    /// Locate the game through this team's log instead of the player's.
    pub team_name: Option<String>,
    pub highlight: Highlight,
    pub target_folder: PathBuf,
    pub video_prefix: String,
    pub output_video_name: String,
    /// Mux whatever downloaded even if some clips failed.
    pub allow_partial: bool,
    pub overwrite: bool,
}

impl HighlightRequest {
    pub fn date_key(&self) -> String {
        self.game_date.format("%Y-%m-%d").to_string()
    }

    pub fn layout(&self) -> ClipLayout {
        ClipLayout::new(self.target_folder.clone(), self.video_prefix.clone())
    }
}

#[derive(Debug)]
pub struct RunSummary {
    pub player_id: u32,
    pub game_id: String,
    pub selected: usize,
    pub report: DownloadReport,
    pub manifest: PathBuf,
    pub output: PathBuf,
}

/// The stats queries a run makes before it starts downloading.
pub trait StatsSource: ClipSource {
    fn player_directory(&self, season: &str) -> Result<Directory>;
    fn game_log(&self, query: GameFinderQuery) -> Result<Vec<GameRow>>;
    fn play_by_play(&self, game_id: &str) -> Result<Vec<GameEvent>>;
}

impl StatsSource for StatsClient {
    fn player_directory(&self, season: &str) -> Result<Directory> {
        StatsClient::player_directory(self, season)
    }

    fn game_log(&self, query: GameFinderQuery) -> Result<Vec<GameRow>> {
        StatsClient::game_log(self, query)
    }

    fn play_by_play(&self, game_id: &str) -> Result<Vec<GameEvent>> {
        StatsClient::play_by_play(self, game_id)
    }
}

pub fn run(settings: &Settings, request: &HighlightRequest) -> Result<RunSummary> {
    let client = StatsClient::new(settings)?;
    run_with(&client, settings, request)
}

pub fn run_with<S: StatsSource + ?Sized>(
    client: &S,
    settings: &Settings,
    request: &HighlightRequest,
) -> Result<RunSummary> {
    let date = request.date_key();

    let season = season_for_date(request.game_date);
    let players = client
        .player_directory(&season)
        .with_context(|| format!("load player index for {season}"))?;
    let player_id = players.resolve(&request.player_name)?;
    info!(player = %request.player_name, player_id, "player resolved");

    let query = match request.team_name.as_deref() {
        Some(team) => GameFinderQuery::Team(Directory::nba_teams().resolve(team)?),
        None => GameFinderQuery::Player(player_id),
    };
    let rows = client.game_log(query)?;
    let game_id = single_game(&games_on_date(&rows, &date), &query.to_string(), &date)?;
    info!(%game_id, %date, "game located");

    let events = client
        .play_by_play(&game_id)
        .with_context(|| format!("play-by-play for {game_id}"))?;
    let selection = request.highlight.select(&events, player_id);
    info!(
        events = events.len(),
        selected = selection.len(),
        highlight = %request.highlight,
        "events filtered"
    );
    if selection.is_empty() {
        return Err(HighlightError::EmptySelection {
            highlight: request.highlight.to_string(),
            player_id,
            game_id,
        }
        .into());
    }

    let layout = request.layout();
    let report = download_clips(client, &selection, &layout, settings.clip_delay)?;
    let (manifest, output) = finish(settings, request, &layout, &report)?;

    Ok(RunSummary {
        player_id,
        game_id,
        selected: selection.len(),
        report,
        manifest,
        output,
    })
}

/// Writes the manifest and muxes, unless failed clips make the result
/// unacceptable for this request.
pub fn finish(
    settings: &Settings,
    request: &HighlightRequest,
    layout: &ClipLayout,
    report: &DownloadReport,
) -> Result<(PathBuf, PathBuf)> {
    let clips = report.saved_paths();
    let failed = report.total() - clips.len();
    if failed > 0 && (!request.allow_partial || clips.is_empty()) {
        return Err(HighlightError::IncompleteDownload {
            failed,
            total: report.total(),
        }
        .into());
    }
    if failed > 0 {
        warn!(failed, total = report.total(), "muxing partial result");
    }

    let manifest = layout.manifest_path();
    write_manifest(&manifest, &clips)?;
    let output = output_file_name(&request.output_video_name);
    ConcatCommand::new(settings.ffmpeg_bin.clone(), manifest.clone(), output.clone())
        .overwrite(request.overwrite)
        .run()?;
    Ok((manifest, output))
}
