//! Caption track extraction and attachment with ffmpeg.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::tool::{ToolCommand, ToolError};

pub struct Muxer {
    ffmpeg: PathBuf,
}

impl Muxer {
    pub fn new(ffmpeg: PathBuf) -> Self {
        Self { ffmpeg }
    }

    fn command(&self) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.ffmpeg);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"]);
        cmd
    }

    /// Writes the first subtitle stream of `video` to `out_srt` as SubRip.
    pub fn extract_subtitles(&self, video: &Path, out_srt: &Path) -> Result<(), ToolError> {
        log::debug!(
            "Extracting subtitles from {} to {}",
            video.display(),
            out_srt.display()
        );

        self.command()
            .arg("-i")
            .arg(video)
            .args(["-map", "0:s:0", "-c:s", "srt"])
            .arg(out_srt)
            .execute()?;

        Ok(())
    }

    /// Copies the video and audio of `video` into `out_video` with `srt` as
    /// its only subtitle track.
    pub fn attach_subtitles(&self, video: &Path, srt: &Path, out_video: &Path) -> Result<(), ToolError> {
        log::debug!(
            "Attaching {} to {} as {}",
            srt.display(),
            video.display(),
            out_video.display()
        );

        self.command()
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(srt)
            .args([
                "-map", "0:v", "-map", "0:a?", "-map", "1:s", "-c:v", "copy", "-c:a", "copy",
                "-c:s", "mov_text",
            ])
            .arg(out_video)
            .execute()?;

        Ok(())
    }

    /// Rebuilds `srt` by muxing it into `video` and extracting it again.
    ///
    /// Auto-generated captions often overlap or contain empty cues; a round
    /// trip through the container gives well-formed, ordered timing.
    pub fn normalize(&self, video: &Path, srt: &Path, workdir: &Path) -> Result<PathBuf> {
        log::debug!("Normalizing auto-generated captions {}", srt.display());

        let ext = video
            .extension()
            .map_or_else(|| "mp4".into(), |e| e.to_string_lossy());
        let remuxed = workdir.join(format!("normalized.{ext}"));
        let normalized = workdir.join("normalized.srt");

        self.attach_subtitles(video, srt, &remuxed)
            .context("Failed to remux captions for normalization")?;
        self.extract_subtitles(&remuxed, &normalized)
            .context("Failed to extract normalized captions")?;
        std::fs::remove_file(&remuxed)?;

        Ok(normalized)
    }
}
