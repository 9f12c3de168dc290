use std::env;
use std::time::Duration;

pub const DEFAULT_STATS_BASE_URL: &str = "https://stats.nba.com/stats";
pub const DEFAULT_VIDEO_BASE_URL: &str = "https://videos.nba.com/nba/pbp/media";
const DEFAULT_CLIP_DELAY_MS: u64 = 1000;
const DEFAULT_FFMPEG_BIN: &str = "ffmpeg";

#[derive(Debug, Clone)]
pub struct Settings {
    pub stats_base_url: String,
    pub video_base_url: String,
    /// Pause after every clip download, successful or not.
    pub clip_delay: Duration,
    pub ffmpeg_bin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stats_base_url: DEFAULT_STATS_BASE_URL.to_string(),
            video_base_url: DEFAULT_VIDEO_BASE_URL.to_string(),
            clip_delay: Duration::from_millis(DEFAULT_CLIP_DELAY_MS),
            ffmpeg_bin: DEFAULT_FFMPEG_BIN.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let text = |key: &str, fallback: String| {
            lookup(key)
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
        };
        let clip_delay = lookup("NBA_CLIP_DELAY_MS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(d.clip_delay);

        Self {
            stats_base_url: text("NBA_STATS_BASE_URL", d.stats_base_url),
            video_base_url: text("NBA_VIDEO_BASE_URL", d.video_base_url),
            clip_delay,
            ffmpeg_bin: text("FFMPEG_BIN", d.ffmpeg_bin),
        }
    }
}
