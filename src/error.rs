//! Domain failures callers may want to match on.
//!
//! Transport and filesystem errors stay in `anyhow` with context; these are the
//! cases where the pipeline itself decides a run cannot continue.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HighlightError {
    #[error("no {kind} named `{name}`")]
    NameNotFound { kind: &'static str, name: String },

    #[error("no game found for {subject} on {date}")]
    GameNotFound { subject: String, date: String },

    #[error("video metadata for event {event_num} of game {game_id} has no {field}")]
    MissingVideoField {
        game_id: String,
        event_num: u32,
        field: &'static str,
    },

    #[error("no {highlight} events for player {player_id} in game {game_id}")]
    EmptySelection {
        highlight: String,
        player_id: u32,
        game_id: String,
    },

    #[error("{failed} of {total} clips failed to download")]
    IncompleteDownload { failed: usize, total: usize },

    #[error("ffmpeg binary `{0}` not found")]
    FfmpegNotFound(String),

    #[error("ffmpeg exited with {status}")]
    FfmpegFailed { status: String },

    #[error("unknown highlight `{0}` (expected shots_made, missed_shots, assists or shots_assists)")]
    InvalidHighlight(String),
}

impl HighlightError {
    pub fn name_not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NameNotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn missing_video_field(game_id: &str, event_num: u32, field: &'static str) -> Self {
        Self::MissingVideoField {
            game_id: game_id.to_string(),
            event_num,
            field,
        }
    }
}
