//! Play-by-play rows and the selection predicates over them.
//!
//! Every filter is a stable O(n) scan: surviving rows keep their input order.

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use crate::stats_api::{StatsClient, cell, parse_result_sets, primary_set, value_as_string, value_as_u32};

/// Event-type code (`EVENTMSGTYPE`) of a play-by-play row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MadeShot,
    MissedShot,
    FreeThrow,
    Rebound,
    Turnover,
    Foul,
    Violation,
    Substitution,
    Timeout,
    JumpBall,
    Ejection,
    PeriodStart,
    PeriodEnd,
    Other(u8),
}

impl EventKind {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::MadeShot,
            2 => Self::MissedShot,
            3 => Self::FreeThrow,
            4 => Self::Rebound,
            5 => Self::Turnover,
            6 => Self::Foul,
            7 => Self::Violation,
            8 => Self::Substitution,
            9 => Self::Timeout,
            10 => Self::JumpBall,
            11 => Self::Ejection,
            12 => Self::PeriodStart,
            13 => Self::PeriodEnd,
            other => Self::Other(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::MadeShot => 1,
            Self::MissedShot => 2,
            Self::FreeThrow => 3,
            Self::Rebound => 4,
            Self::Turnover => 5,
            Self::Foul => 6,
            Self::Violation => 7,
            Self::Substitution => 8,
            Self::Timeout => 9,
            Self::JumpBall => 10,
            Self::Ejection => 11,
            Self::PeriodStart => 12,
            Self::PeriodEnd => 13,
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEvent {
    pub game_id: String,
    /// Unique within a game and increasing with game time.
    pub event_num: u32,
    pub kind: EventKind,
    pub player1_id: Option<u32>,
    /// Assist credit on made shots.
    pub player2_id: Option<u32>,
    pub home_description: Option<String>,
    pub visitor_description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Home,
    Away,
}

pub fn parse_play_by_play(raw: &str) -> Result<Vec<GameEvent>> {
    let Some(set) = primary_set(parse_result_sets(raw)?, "PlayByPlay") else {
        return Ok(Vec::new());
    };
    let game_col = set.require_column("GAME_ID")?;
    let num_col = set.require_column("EVENTNUM")?;
    let kind_col = set.require_column("EVENTMSGTYPE")?;
    let p1_col = set.require_column("PLAYER1_ID")?;
    let p2_col = set.require_column("PLAYER2_ID")?;
    let home_col = set.column("HOMEDESCRIPTION");
    let visitor_col = set.column("VISITORDESCRIPTION");

    let mut out = Vec::with_capacity(set.rows.len());
    for (idx, row) in set.rows.iter().enumerate() {
        let event_num = value_as_u32(cell(row, num_col));
        let code = value_as_u32(cell(row, kind_col));
        let (Some(event_num), Some(code)) = (event_num, code) else {
            warn!(
                row = idx,
                eventnum = %cell(row, num_col),
                eventmsgtype = %cell(row, kind_col),
                "skipping play-by-play row without integer EVENTNUM/EVENTMSGTYPE"
            );
            continue;
        };
        out.push(GameEvent {
            game_id: value_as_string(cell(row, game_col)).unwrap_or_default(),
            event_num,
            kind: EventKind::from_code(u8::try_from(code).unwrap_or(u8::MAX)),
            player1_id: player_id(cell(row, p1_col)),
            player2_id: player_id(cell(row, p2_col)),
            home_description: home_col.and_then(|c| description(cell(row, c))),
            visitor_description: visitor_col.and_then(|c| description(cell(row, c))),
        });
    }
    Ok(out)
}

fn player_id(v: &Value) -> Option<u32> {
    value_as_u32(v).filter(|id| *id != 0)
}

fn description(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.to_string())
}

impl StatsClient {
    pub fn play_by_play(&self, game_id: &str) -> Result<Vec<GameEvent>> {
        let params = [
            ("GameID", game_id.to_string()),
            ("StartPeriod", "0".to_string()),
            ("EndPeriod", "0".to_string()),
        ];
        let body = self.get_json("playbyplayv2", &params)?;
        parse_play_by_play(&body)
    }
}

fn select<F>(events: &[GameEvent], keep: F) -> Vec<GameEvent>
where
    F: Fn(&GameEvent) -> bool,
{
    events.iter().filter(|e| keep(*e)).cloned().collect()
}

pub fn made_shots(events: &[GameEvent]) -> Vec<GameEvent> {
    select(events, |e| e.kind == EventKind::MadeShot)
}

pub fn missed_shots(events: &[GameEvent]) -> Vec<GameEvent> {
    select(events, |e| e.kind == EventKind::MissedShot)
}

pub fn made_shots_by_player(events: &[GameEvent], player_id: u32) -> Vec<GameEvent> {
    select(events, |e| {
        e.kind == EventKind::MadeShot && e.player1_id == Some(player_id)
    })
}

pub fn missed_shots_by_player(events: &[GameEvent], player_id: u32) -> Vec<GameEvent> {
    select(events, |e| {
        e.kind == EventKind::MissedShot && e.player1_id == Some(player_id)
    })
}

pub fn assists_by_player(events: &[GameEvent], player_id: u32) -> Vec<GameEvent> {
    select(events, |e| {
        e.kind == EventKind::MadeShot && e.player2_id == Some(player_id)
    })
}

pub fn shots_assists_by_player(events: &[GameEvent], player_id: u32) -> Vec<GameEvent> {
    let p = Some(player_id);
    select(events, |e| {
        e.kind == EventKind::MadeShot && (e.player1_id == p || e.player2_id == p)
    })
}

/// Rows described from one side's point of view. Not combined with the
/// highlight filters by the CLI.
pub fn by_side(events: &[GameEvent], side: Side) -> Vec<GameEvent> {
    match side {
        Side::Home => select(events, |e| e.home_description.is_some()),
        Side::Away => select(events, |e| e.visitor_description.is_some()),
    }
}
