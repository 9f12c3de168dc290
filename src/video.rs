use anyhow::{Context, Result};
use serde_json::Value;

use crate::error::HighlightError;
use crate::stats_api::{StatsClient, value_as_string};

/// Only this rendition is requested.
pub const CLIP_RESOLUTION: &str = "1280x720";

/// Where the media host keeps one event's clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoMeta {
    pub uuid: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

pub fn parse_video_meta(raw: &str, game_id: &str, event_num: u32) -> Result<VideoMeta> {
    let root: Value = serde_json::from_str(raw.trim()).context("invalid videoevents json")?;
    let sets = root.get("resultSets").unwrap_or(&Value::Null);
    let missing = |field| HighlightError::missing_video_field(game_id, event_num, field);

    let uuid = sets
        .get("Meta")
        .and_then(|m| m.get("videoUrls"))
        .and_then(|v| v.get(0))
        .and_then(|v| v.get("uuid"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| missing("uuid"))?;

    let entry = sets
        .get("playlist")
        .and_then(|p| p.get(0))
        .ok_or_else(|| missing("playlist"))?;
    let part = |key: &'static str| {
        entry
            .get(key)
            .and_then(value_as_string)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing(key))
    };

    Ok(VideoMeta {
        uuid: uuid.to_string(),
        year: part("y")?,
        month: part("m")?,
        day: part("d")?,
    })
}

pub fn clip_url(base: &str, game_id: &str, event_num: u32, meta: &VideoMeta) -> String {
    format!(
        "{}/{}/{}/{}/{game_id}/{event_num}/{}_{CLIP_RESOLUTION}.mp4",
        base.trim_end_matches('/'),
        meta.year,
        meta.month,
        meta.day,
        meta.uuid
    )
}

impl StatsClient {
    pub fn video_meta(&self, game_id: &str, event_num: u32) -> Result<VideoMeta> {
        let params = [
            ("GameID", game_id.to_string()),
            ("GameEventID", event_num.to_string()),
        ];
        let body = self.get_json("videoevents", &params)?;
        parse_video_meta(&body, game_id, event_num)
    }
}
