use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::events::GameEvent;
use crate::stats_api::StatsClient;
use crate::video::{VideoMeta, clip_url};

/// Everything the download loop needs from the network.
pub trait ClipSource {
    fn video_meta(&self, game_id: &str, event_num: u32) -> Result<VideoMeta>;
    fn clip_base_url(&self) -> &str;
    fn fetch_clip(&self, url: &str) -> Result<Vec<u8>>;
}

impl ClipSource for StatsClient {
    fn video_meta(&self, game_id: &str, event_num: u32) -> Result<VideoMeta> {
        StatsClient::video_meta(self, game_id, event_num)
    }

    fn clip_base_url(&self) -> &str {
        self.video_base_url()
    }

    fn fetch_clip(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_bytes(url)
    }
}

/// Naming of clip files and the concat manifest.
#[derive(Debug, Clone)]
pub struct ClipLayout {
    pub target_folder: PathBuf,
    pub video_prefix: String,
}

impl ClipLayout {
    pub fn new(target_folder: impl Into<PathBuf>, video_prefix: impl Into<String>) -> Self {
        Self {
            target_folder: target_folder.into(),
            video_prefix: video_prefix.into(),
        }
    }

    /// `position` is 1-based selection order.
    pub fn clip_path(&self, position: usize) -> PathBuf {
        self.target_folder
            .join(format!("{}_{position}.mp4", self.video_prefix))
    }

    /// `{target_folder}.txt`, next to the folder.
    pub fn manifest_path(&self) -> PathBuf {
        let mut name = self
            .target_folder
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "clips".into());
        name.push(".txt");
        self.target_folder.with_file_name(name)
    }

    pub fn ensure_folder(&self) -> Result<()> {
        fs::create_dir_all(&self.target_folder)
            .with_context(|| format!("create {}", self.target_folder.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipStatus {
    Saved(PathBuf),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub position: usize,
    pub event_num: u32,
    pub status: ClipStatus,
}

#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub outcomes: Vec<ClipOutcome>,
}

impl DownloadReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Saved clip paths in selection order.
    pub fn saved_paths(&self) -> Vec<PathBuf> {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                ClipStatus::Saved(path) => Some(path.clone()),
                ClipStatus::Failed(_) => None,
            })
            .collect()
    }

    pub fn failures(&self) -> Vec<&ClipOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, ClipStatus::Failed(_)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o.status, ClipStatus::Saved(_)))
    }
}

/// Downloads one clip per event, strictly in order, pausing `delay` after
/// each. A failed event is recorded and the loop moves on.
pub fn download_clips<S: ClipSource + ?Sized>(
    source: &S,
    selection: &[GameEvent],
    layout: &ClipLayout,
    delay: Duration,
) -> Result<DownloadReport> {
    layout.ensure_folder()?;
    let total = selection.len();
    let mut report = DownloadReport {
        outcomes: Vec::with_capacity(total),
    };

    for (idx, event) in selection.iter().enumerate() {
        let position = idx + 1;
        let path = layout.clip_path(position);
        let status = match download_one(source, event, &path) {
            Ok(bytes) => {
                info!(position, total, event_num = event.event_num, bytes, "clip saved");
                ClipStatus::Saved(path)
            }
            Err(err) => {
                warn!(position, total, event_num = event.event_num, "clip failed: {err:#}");
                ClipStatus::Failed(format!("{err:#}"))
            }
        };
        report.outcomes.push(ClipOutcome {
            position,
            event_num: event.event_num,
            status,
        });
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    Ok(report)
}

fn download_one<S: ClipSource + ?Sized>(source: &S, event: &GameEvent, path: &Path) -> Result<usize> {
    let meta = source.video_meta(&event.game_id, event.event_num)?;
    let url = clip_url(source.clip_base_url(), &event.game_id, event.event_num, &meta);
    let body = source
        .fetch_clip(&url)
        .with_context(|| format!("download {url}"))?;
    fs::write(path, &body).with_context(|| format!("write {}", path.display()))?;
    Ok(body.len())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::ClipLayout;

    #[test]
    fn layout_paths() {
        let layout = ClipLayout::new("videos", "doncic_ast");
        assert_eq!(layout.clip_path(3), PathBuf::from("videos/doncic_ast_3.mp4"));
        assert_eq!(layout.manifest_path(), PathBuf::from("videos.txt"));
    }

    #[test]
    fn nested_folder_manifest_sits_beside_it() {
        let layout = ClipLayout::new("out/videos/", "clip");
        assert_eq!(layout.manifest_path(), PathBuf::from("out/videos.txt"));
    }
}
