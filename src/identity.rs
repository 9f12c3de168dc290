use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use tracing::warn;

use crate::error::HighlightError;
use crate::stats_api::{ResultSet, StatsClient, cell, parse_result_sets, primary_set, value_as_string, value_as_u32};

const NBA_TEAMS: &[(u32, &str)] = &[
    (1610612737, "Atlanta Hawks"),
    (1610612738, "Boston Celtics"),
    (1610612739, "Cleveland Cavaliers"),
    (1610612740, "New Orleans Pelicans"),
    (1610612741, "Chicago Bulls"),
    (1610612742, "Dallas Mavericks"),
    (1610612743, "Denver Nuggets"),
    (1610612744, "Golden State Warriors"),
    (1610612745, "Houston Rockets"),
    (1610612746, "Los Angeles Clippers"),
    (1610612747, "Los Angeles Lakers"),
    (1610612748, "Miami Heat"),
    (1610612749, "Milwaukee Bucks"),
    (1610612750, "Minnesota Timberwolves"),
    (1610612751, "Brooklyn Nets"),
    (1610612752, "New York Knicks"),
    (1610612753, "Orlando Magic"),
    (1610612754, "Indiana Pacers"),
    (1610612755, "Philadelphia 76ers"),
    (1610612756, "Phoenix Suns"),
    (1610612757, "Portland Trail Blazers"),
    (1610612758, "Sacramento Kings"),
    (1610612759, "San Antonio Spurs"),
    (1610612760, "Oklahoma City Thunder"),
    (1610612761, "Toronto Raptors"),
    (1610612762, "Utah Jazz"),
    (1610612763, "Memphis Grizzlies"),
    (1610612764, "Washington Wizards"),
    (1610612765, "Detroit Pistons"),
    (1610612766, "Charlotte Hornets"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub id: u32,
    pub full_name: String,
}

/// Name to id reference table. Lookups are exact (ASCII case and outer
/// whitespace aside) and the first match wins.
#[derive(Debug, Clone)]
pub struct Directory {
    kind: &'static str,
    entries: Vec<DirectoryEntry>,
}

impl Directory {
    pub fn new(kind: &'static str, entries: Vec<DirectoryEntry>) -> Self {
        Self { kind, entries }
    }

    pub fn nba_teams() -> Self {
        let entries = NBA_TEAMS
            .iter()
            .map(|(id, name)| DirectoryEntry {
                id: *id,
                full_name: name.to_string(),
            })
            .collect();
        Self::new("team", entries)
    }

    pub fn from_player_index(set: &ResultSet) -> Result<Self> {
        let id_col = set.require_column("PERSON_ID")?;
        let name_col = set.require_column("DISPLAY_FIRST_LAST")?;
        let entries = set
            .rows
            .iter()
            .filter_map(|row| {
                let id = value_as_u32(cell(row, id_col))?;
                let full_name = value_as_string(cell(row, name_col))?;
                Some(DirectoryEntry { id, full_name })
            })
            .collect();
        Ok(Self::new("player", entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find_by_full_name(&self, name: &str) -> Vec<&DirectoryEntry> {
        let wanted = name.trim();
        self.entries
            .iter()
            .filter(|e| e.full_name.trim().eq_ignore_ascii_case(wanted))
            .collect()
    }

    pub fn resolve(&self, name: &str) -> Result<u32, HighlightError> {
        let matches = self.find_by_full_name(name);
        let Some(first) = matches.first() else {
            return Err(HighlightError::name_not_found(self.kind, name.trim()));
        };
        if matches.len() > 1 {
            let ids = matches.iter().map(|e| e.id).collect::<Vec<_>>();
            warn!(kind = self.kind, name, ?ids, "ambiguous name, using first match");
        }
        Ok(first.id)
    }
}

/// Season label such as `2020-21`. A season starts in October.
pub fn season_for_date(date: NaiveDate) -> String {
    let start = if date.month() >= 10 {
        date.year()
    } else {
        date.year() - 1
    };
    format!("{start}-{:02}", (start + 1).rem_euclid(100))
}

impl StatsClient {
    pub fn player_directory(&self, season: &str) -> Result<Directory> {
        let params = [
            ("LeagueID", "00".to_string()),
            ("Season", season.to_string()),
            ("IsOnlyCurrentSeason", "0".to_string()),
        ];
        let body = self.get_json("commonallplayers", &params)?;
        let sets = parse_result_sets(&body)?;
        let set = primary_set(sets, "CommonAllPlayers").context("player index has no result set")?;
        Directory::from_player_index(&set)
    }
}
