use std::fmt;

use anyhow::Result;
use tracing::warn;

use crate::error::HighlightError;
use crate::stats_api::{StatsClient, cell, parse_result_sets, primary_set, value_as_string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFinderQuery {
    Player(u32),
    Team(u32),
}

impl GameFinderQuery {
    fn params(self) -> Vec<(&'static str, String)> {
        match self {
            Self::Player(id) => vec![
                ("PlayerOrTeam", "P".to_string()),
                ("PlayerID", id.to_string()),
            ],
            Self::Team(id) => vec![
                ("PlayerOrTeam", "T".to_string()),
                ("TeamID", id.to_string()),
            ],
        }
    }
}

impl fmt::Display for GameFinderQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player(id) => write!(f, "player {id}"),
            Self::Team(id) => write!(f, "team {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRow {
    pub game_id: String,
    pub game_date: String,
}

pub fn parse_game_log(raw: &str) -> Result<Vec<GameRow>> {
    let Some(set) = primary_set(parse_result_sets(raw)?, "LeagueGameFinderResults") else {
        return Ok(Vec::new());
    };
    let id_col = set.require_column("GAME_ID")?;
    let date_col = set.require_column("GAME_DATE")?;
    Ok(set
        .rows
        .iter()
        .filter_map(|row| {
            Some(GameRow {
                game_id: value_as_string(cell(row, id_col))?,
                game_date: value_as_string(cell(row, date_col))?,
            })
        })
        .collect())
}

/// Ids of games played on `date`, compared as plain strings.
pub fn games_on_date(rows: &[GameRow], date: &str) -> Vec<String> {
    rows.iter()
        .filter(|r| r.game_date == date)
        .map(|r| r.game_id.clone())
        .collect()
}

pub fn single_game(ids: &[String], subject: &str, date: &str) -> Result<String, HighlightError> {
    let Some(first) = ids.first() else {
        return Err(HighlightError::GameNotFound {
            subject: subject.to_string(),
            date: date.to_string(),
        });
    };
    if ids.len() > 1 {
        warn!(subject, date, ?ids, "several games on date, using the first");
    }
    Ok(first.clone())
}

impl StatsClient {
    pub fn game_log(&self, query: GameFinderQuery) -> Result<Vec<GameRow>> {
        let body = self.get_json("leaguegamefinder", &query.params())?;
        parse_game_log(&body)
    }

    pub fn locate_game(&self, query: GameFinderQuery, date: &str) -> Result<String> {
        let rows = self.game_log(query)?;
        let ids = games_on_date(&rows, date);
        Ok(single_game(&ids, &query.to_string(), date)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{GameRow, games_on_date, single_game};
    use crate::error::HighlightError;

    fn row(id: &str, date: &str) -> GameRow {
        GameRow {
            game_id: id.to_string(),
            game_date: date.to_string(),
        }
    }

    #[test]
    fn date_match_is_exact() {
        let rows = vec![
            row("0042000131", "2021-05-22"),
            row("0042000132", "2021-05-25"),
            row("0042000133", "2021-05-22T00:00:00"),
        ];
        assert_eq!(games_on_date(&rows, "2021-05-22"), vec!["0042000131"]);
        assert!(games_on_date(&rows, "2021-5-22").is_empty());
    }

    #[test]
    fn no_game_is_not_found() {
        let err = single_game(&[], "player 1", "2021-05-22").unwrap_err();
        assert!(matches!(err, HighlightError::GameNotFound { .. }));
    }

    #[test]
    fn first_game_is_used() {
        let ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(single_game(&ids, "team 1", "2021-05-22").expect("found"), "a");
    }
}
