use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::error::HighlightError;
use crate::events::{
    GameEvent, assists_by_player, made_shots_by_player, missed_shots_by_player,
    shots_assists_by_player,
};

/// Which of a player's events end up in the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum Highlight {
    ShotsMade,
    MissedShots,
    Assists,
    ShotsAssists,
}

impl Highlight {
    pub const ALL: [Highlight; 4] = [
        Highlight::ShotsMade,
        Highlight::MissedShots,
        Highlight::Assists,
        Highlight::ShotsAssists,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ShotsMade => "shots_made",
            Self::MissedShots => "missed_shots",
            Self::Assists => "assists",
            Self::ShotsAssists => "shots_assists",
        }
    }

    pub fn select(self, events: &[GameEvent], player_id: u32) -> Vec<GameEvent> {
        match self {
            Self::ShotsMade => made_shots_by_player(events, player_id),
            Self::MissedShots => missed_shots_by_player(events, player_id),
            Self::Assists => assists_by_player(events, player_id),
            Self::ShotsAssists => shots_assists_by_player(events, player_id),
        }
    }
}

impl fmt::Display for Highlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Highlight {
    type Err = HighlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|h| h.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| HighlightError::InvalidHighlight(wanted.to_string()))
    }
}
