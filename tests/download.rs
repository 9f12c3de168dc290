use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use chrono::NaiveDate;

use nba_highlights::config::Settings;
use nba_highlights::download::{ClipLayout, ClipSource, ClipStatus, download_clips};
use nba_highlights::error::HighlightError;
use nba_highlights::events::{EventKind, GameEvent};
use nba_highlights::highlight::Highlight;
use nba_highlights::pipeline::{HighlightRequest, finish};
use nba_highlights::video::VideoMeta;

const BASE: &str = "https://media.test/pbp";

struct FakeSource {
    broken_meta: HashSet<u32>,
    broken_clip: HashSet<u32>,
    requested: RefCell<Vec<String>>,
}

impl FakeSource {
    fn healthy() -> Self {
        Self {
            broken_meta: HashSet::new(),
            broken_clip: HashSet::new(),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl ClipSource for FakeSource {
    fn video_meta(&self, game_id: &str, event_num: u32) -> Result<VideoMeta> {
        if self.broken_meta.contains(&event_num) {
            return Err(HighlightError::missing_video_field(game_id, event_num, "uuid").into());
        }
        Ok(VideoMeta {
            uuid: format!("uuid-{event_num}"),
            year: "2021".to_string(),
            month: "05".to_string(),
            day: "22".to_string(),
        })
    }

    fn clip_base_url(&self) -> &str {
        BASE
    }

    fn fetch_clip(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.borrow_mut().push(url.to_string());
        if self.broken_clip.iter().any(|n| url.contains(&format!("/uuid-{n}_"))) {
            return Err(anyhow!("http 404 Not Found for {url}"));
        }
        Ok(format!("clip:{url}").into_bytes())
    }
}

fn shot(event_num: u32) -> GameEvent {
    GameEvent {
        game_id: "0042000131".to_string(),
        event_num,
        kind: EventKind::MadeShot,
        player1_id: Some(1629029),
        player2_id: None,
        home_description: None,
        visitor_description: Some(format!("shot {event_num}")),
    }
}

fn request(folder: PathBuf, allow_partial: bool) -> HighlightRequest {
    HighlightRequest {
        game_date: NaiveDate::from_ymd_opt(2021, 5, 22).expect("valid date"),
        player_name: "Luka Doncic".to_string(),
        team_name: None,
        highlight: Highlight::ShotsMade,
        target_folder: folder,
        video_prefix: "doncic".to_string(),
        output_video_name: "doncic_made".to_string(),
        allow_partial,
        overwrite: false,
    }
}

fn settings_without_ffmpeg() -> Settings {
    Settings {
        ffmpeg_bin: "ffmpeg-binary-that-does-not-exist".to_string(),
        clip_delay: Duration::ZERO,
        ..Settings::default()
    }
}

#[test]
fn clips_are_numbered_in_selection_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ClipLayout::new(dir.path().join("videos"), "doncic");
    let source = FakeSource::healthy();
    let selection = vec![shot(30), shot(10), shot(20)];

    let report = download_clips(&source, &selection, &layout, Duration::ZERO).expect("run");
    assert!(report.is_complete());
    assert_eq!(report.total(), 3);

    let requested = source.requested.borrow();
    assert_eq!(
        requested[0],
        "https://media.test/pbp/2021/05/22/0042000131/30/uuid-30_1280x720.mp4"
    );
    for (idx, event) in selection.iter().enumerate() {
        let path = layout.clip_path(idx + 1);
        let body = fs::read_to_string(&path).expect("clip written");
        assert!(body.contains(&format!("/{}/uuid-{}_", event.event_num, event.event_num)));
        assert_eq!(report.outcomes[idx].status, ClipStatus::Saved(path));
        assert_eq!(report.outcomes[idx].position, idx + 1);
    }
}

#[test]
fn failed_clip_is_reported_and_loop_continues() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ClipLayout::new(dir.path().join("videos"), "doncic");
    let mut source = FakeSource::healthy();
    source.broken_meta.insert(20);
    source.broken_clip.insert(40);
    let selection = vec![shot(10), shot(20), shot(30), shot(40)];

    let report = download_clips(&source, &selection, &layout, Duration::ZERO).expect("run");
    assert!(!report.is_complete());
    let failed = report.failures().iter().map(|o| o.event_num).collect::<Vec<_>>();
    assert_eq!(failed, vec![20, 40]);
    assert_eq!(report.saved_paths(), vec![layout.clip_path(1), layout.clip_path(3)]);
    assert!(!layout.clip_path(2).exists());
    assert!(!layout.clip_path(4).exists());
    // metadata failure never reaches the media host
    assert_eq!(source.requested.borrow().len(), 3);
}

#[test]
fn incomplete_download_is_not_muxed_by_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let req = request(dir.path().join("videos"), false);
    let layout = req.layout();
    let mut source = FakeSource::healthy();
    source.broken_clip.insert(20);
    let report =
        download_clips(&source, &[shot(10), shot(20)], &layout, Duration::ZERO).expect("run");

    let err = finish(&settings_without_ffmpeg(), &req, &layout, &report).unwrap_err();
    let err = err.downcast::<HighlightError>().expect("domain error");
    assert!(matches!(
        err,
        HighlightError::IncompleteDownload { failed: 1, total: 2 }
    ));
    assert!(!layout.manifest_path().exists());
}

#[test]
fn partial_download_writes_manifest_of_saved_clips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let req = request(dir.path().join("videos"), true);
    let layout = req.layout();
    let mut source = FakeSource::healthy();
    source.broken_clip.insert(20);
    let report = download_clips(&source, &[shot(10), shot(20), shot(30)], &layout, Duration::ZERO)
        .expect("run");

    let err = finish(&settings_without_ffmpeg(), &req, &layout, &report).unwrap_err();
    let err = err.downcast::<HighlightError>().expect("domain error");
    assert!(matches!(err, HighlightError::FfmpegNotFound(_)));

    let manifest = fs::read_to_string(layout.manifest_path()).expect("manifest written");
    let lines = manifest.lines().collect::<Vec<_>>();
    assert_eq!(lines, vec!["file videos/doncic_1.mp4", "file videos/doncic_3.mp4"]);
}

#[test]
fn complete_download_manifest_matches_clip_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    let req = request(dir.path().join("videos"), false);
    let layout = req.layout();
    let source = FakeSource::healthy();
    let selection = (1..=5).map(|n| shot(n * 10)).collect::<Vec<_>>();
    let report = download_clips(&source, &selection, &layout, Duration::ZERO).expect("run");

    let err = finish(&settings_without_ffmpeg(), &req, &layout, &report).unwrap_err();
    let err = err.downcast::<HighlightError>().expect("domain error");
    assert!(matches!(err, HighlightError::FfmpegNotFound(_)));
    let manifest = fs::read_to_string(layout.manifest_path()).expect("manifest written");
    let lines = manifest.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), report.saved_paths().len());
    for (idx, line) in lines.iter().enumerate() {
        assert_eq!(*line, format!("file videos/doncic_{}.mp4", idx + 1));
    }
}

#[test]
fn pause_follows_every_clip_including_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ClipLayout::new(dir.path().join("videos"), "doncic");
    let mut source = FakeSource::healthy();
    source.broken_meta.insert(20);
    source.broken_clip.insert(30);
    let selection = vec![shot(10), shot(20), shot(30)];
    let delay = Duration::from_millis(20);

    let started = Instant::now();
    let report = download_clips(&source, &selection, &layout, delay).expect("run");
    let elapsed = started.elapsed();

    assert_eq!(report.failures().len(), 2);
    assert!(
        elapsed >= delay * selection.len() as u32,
        "elapsed {elapsed:?} is shorter than one pause per clip"
    );
}
