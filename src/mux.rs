//! Concat manifest and the ffmpeg invocation that joins the clips.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::info;

use crate::error::HighlightError;

/// One `file <path>` line per clip, in the given order. Paths are made
/// relative to the manifest's directory, which is how the concat demuxer
/// resolves them.
pub fn manifest_lines(manifest_path: &Path, clips: &[PathBuf]) -> Vec<String> {
    let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    clips
        .iter()
        .map(|clip| {
            let rel = clip.strip_prefix(base).unwrap_or(clip.as_path());
            format!("file {}", quote_path(&rel.to_string_lossy()))
        })
        .collect()
}

fn quote_path(path: &str) -> String {
    let plain = path
        .chars()
        .all(|c| !c.is_whitespace() && c != '\'' && c != '\\' && c != '#');
    if plain {
        return path.to_string();
    }
    format!("'{}'", path.replace('\'', r"'\''"))
}

pub fn write_manifest(manifest_path: &Path, clips: &[PathBuf]) -> Result<()> {
    let mut body = manifest_lines(manifest_path, clips).join("\n");
    body.push('\n');
    fs::write(manifest_path, body)
        .with_context(|| format!("write manifest {}", manifest_path.display()))
}

/// `ffmpeg -safe 0 -f concat -i <manifest> -c copy <output>`; stream copy,
/// no re-encode.
#[derive(Debug, Clone)]
pub struct ConcatCommand {
    pub ffmpeg: String,
    pub manifest: PathBuf,
    pub output: PathBuf,
    pub overwrite: bool,
}

impl ConcatCommand {
    pub fn new(ffmpeg: impl Into<String>, manifest: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            manifest: manifest.into(),
            output: output.into(),
            overwrite: false,
        }
    }

    pub fn overwrite(mut self, yes: bool) -> Self {
        self.overwrite = yes;
        self
    }

    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.overwrite {
            args.push("-y".to_string());
        }
        args.extend(["-safe", "0", "-f", "concat", "-i"].map(String::from));
        args.push(self.manifest.to_string_lossy().into_owned());
        args.extend(["-c", "copy"].map(String::from));
        args.push(self.output.to_string_lossy().into_owned());
        args
    }

    pub fn run(&self) -> Result<()> {
        let bin = which::which(&self.ffmpeg)
            .map_err(|_| HighlightError::FfmpegNotFound(self.ffmpeg.clone()))?;
        let args = self.args();
        info!(bin = %bin.display(), ?args, "running concat");
        let status = Command::new(&bin)
            .args(&args)
            .stdin(Stdio::null())
            .status()
            .with_context(|| format!("spawn {}", bin.display()))?;
        if !status.success() {
            return Err(HighlightError::FfmpegFailed {
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Final file name: `<stem>.mp4`.
pub fn output_file_name(stem: &str) -> PathBuf {
    PathBuf::from(format!("{stem}.mp4"))
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{ConcatCommand, manifest_lines, output_file_name};

    #[test]
    fn manifest_lines_follow_clip_order() {
        let clips = vec![
            PathBuf::from("videos/clip_1.mp4"),
            PathBuf::from("videos/clip_2.mp4"),
        ];
        let lines = manifest_lines(Path::new("videos.txt"), &clips);
        assert_eq!(lines, vec!["file videos/clip_1.mp4", "file videos/clip_2.mp4"]);
    }

    #[test]
    fn manifest_paths_are_relative_to_manifest_dir() {
        let clips = vec![PathBuf::from("out/videos/clip_1.mp4")];
        let lines = manifest_lines(Path::new("out/videos.txt"), &clips);
        assert_eq!(lines, vec!["file videos/clip_1.mp4"]);
    }

    #[test]
    fn awkward_paths_are_quoted() {
        let clips = vec![PathBuf::from("my clips/it's_1.mp4")];
        let lines = manifest_lines(Path::new("my clips.txt"), &clips);
        assert_eq!(lines, vec![r"file 'my clips/it'\''s_1.mp4'"]);
    }

    #[test]
    fn concat_args_are_stream_copy() {
        let cmd = ConcatCommand::new("ffmpeg", "videos.txt", output_file_name("output"));
        assert_eq!(
            cmd.args(),
            vec!["-safe", "0", "-f", "concat", "-i", "videos.txt", "-c", "copy", "output.mp4"]
        );
        let cmd = cmd.overwrite(true);
        assert_eq!(cmd.args()[0], "-y");
    }
}
