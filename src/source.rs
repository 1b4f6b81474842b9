//! Resolution of user references into a local caption file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::cli::progress::Steps;
use crate::mux::Muxer;
use crate::tool::{ToolCommand, ToolError, Tools};

/// Prefix marking auto-generated captions, e.g. `a.en`.
pub const AUTO_CAPTION_PREFIX: &str = "a.";

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("No {lang:?} caption track available")]
    MissingSubtitle {
        lang: String,
        #[source]
        cause: Option<ToolError>,
    },

    #[error("Input not found: {0}")]
    NotFound(PathBuf),
}

/// What the user pointed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// SubRip text on stdin.
    Stdin,
    /// A local `.srt` file.
    Subtitles(PathBuf),
    /// A local video with an embedded caption track.
    Video(PathBuf),
    /// A remote video page handled by yt-dlp.
    Remote(String),
}

impl Reference {
    pub fn classify(input: &str) -> Self {
        if input == "-" {
            return Reference::Stdin;
        }
        if input.starts_with("http://") || input.starts_with("https://") {
            return Reference::Remote(input.to_string());
        }

        let path = PathBuf::from(input);
        let is_srt = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("srt"));

        if is_srt {
            Reference::Subtitles(path)
        } else {
            Reference::Video(path)
        }
    }
}

/// A caption file ready for parsing, plus the video it belongs to.
#[derive(Debug, Clone)]
pub struct Acquired {
    pub video: Option<PathBuf>,
    /// `None` when the captions arrive on stdin.
    pub subtitles: Option<PathBuf>,
}

pub struct VideoSource<'a> {
    tools: &'a Tools,
    workdir: &'a Path,
    steps: &'a Steps<'a>,
}

impl<'a> VideoSource<'a> {
    pub fn new(tools: &'a Tools, workdir: &'a Path, steps: &'a Steps<'a>) -> Self {
        Self {
            tools,
            workdir,
            steps,
        }
    }

    /// Produces a local caption file for `reference` in language `lang`.
    ///
    /// `lang` values starting with `a.` select auto-generated captions, which
    /// are normalized through the muxer when `normalize` is set.
    pub fn acquire(&self, reference: &Reference, lang: &str, normalize: bool) -> Result<Acquired> {
        let acquired = match reference {
            Reference::Stdin => Acquired {
                video: None,
                subtitles: None,
            },
            Reference::Subtitles(path) => {
                ensure_exists(path)?;
                Acquired {
                    video: None,
                    subtitles: Some(path.clone()),
                }
            }
            Reference::Video(path) => {
                ensure_exists(path)?;
                let subtitles = self.extract_local(path, lang)?;
                Acquired {
                    video: Some(path.clone()),
                    subtitles: Some(subtitles),
                }
            }
            Reference::Remote(url) => self.download(url, lang)?,
        };

        match (&acquired.video, &acquired.subtitles) {
            (Some(video), Some(subtitles)) if normalize && is_auto_caption(lang) => {
                let muxer = Muxer::new(self.tools.ffmpeg()?);
                let normalized = self.steps.run("Normalizing captions", || {
                    muxer.normalize(video, subtitles, self.workdir)
                })?;
                Ok(Acquired {
                    video: acquired.video,
                    subtitles: Some(normalized),
                })
            }
            _ => Ok(acquired),
        }
    }

    fn extract_local(&self, video: &Path, lang: &str) -> Result<PathBuf> {
        let muxer = Muxer::new(self.tools.ffmpeg()?);
        let out = self.workdir.join(format!("{}.srt", file_stem(video)));

        log::info!("Extracting caption track from {}", video.display());
        let extracted = self
            .steps
            .run("Extracting captions", || Ok(muxer.extract_subtitles(video, &out)))?;

        match extracted {
            Ok(()) if non_empty(&out) => Ok(out),
            Ok(()) => bail!(SourceError::MissingSubtitle {
                lang: lang.to_string(),
                cause: None,
            }),
            Err(cause) => bail!(SourceError::MissingSubtitle {
                lang: lang.to_string(),
                cause: Some(cause),
            }),
        }
    }

    fn download(&self, url: &str, lang: &str) -> Result<Acquired> {
        let yt_dlp = self.tools.yt_dlp()?;
        let template = self.workdir.join("%(id)s.%(ext)s");

        log::info!("Downloading {url}");
        self.steps.run("Downloading video", || {
            ToolCommand::new(&yt_dlp)
                .args([
                    "--no-playlist",
                    "--quiet",
                    "-f",
                    "bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/b",
                    "--merge-output-format",
                    "mp4",
                    "-o",
                ])
                .arg(&template)
                .arg(url)
                .execute()
                .context("Failed to download video")
        })?;

        let (sub_flag, sub_lang) = match lang.strip_prefix(AUTO_CAPTION_PREFIX) {
            Some(auto) => ("--write-auto-subs", auto),
            None => ("--write-subs", lang),
        };
        let caption_template = self.workdir.join("captions.%(ext)s");

        let fetched = self.steps.run("Downloading captions", || {
            Ok(ToolCommand::new(&yt_dlp)
                .args(["--no-playlist", "--quiet", "--skip-download", sub_flag])
                .args(["--sub-langs", sub_lang, "--convert-subs", "srt", "-o"])
                .arg(&caption_template)
                .arg(url)
                .execute())
        })?;

        let subtitles = find_file(self.workdir, "captions.", "srt")?;
        let Some(subtitles) = subtitles.filter(|path| non_empty(path)) else {
            bail!(SourceError::MissingSubtitle {
                lang: lang.to_string(),
                cause: fetched.err(),
            });
        };

        let video = find_file(self.workdir, "", "mp4")?
            .context("yt-dlp did not produce an MP4 file")?;

        Ok(Acquired {
            video: Some(video),
            subtitles: Some(subtitles),
        })
    }
}

pub fn is_auto_caption(lang: &str) -> bool {
    lang.starts_with(AUTO_CAPTION_PREFIX)
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().into_owned())
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!(SourceError::NotFound(path.to_path_buf()));
    }
    Ok(())
}

fn non_empty(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.len() > 0)
}

/// First file in `dir` whose name starts with `prefix` and has extension `ext`.
fn find_file(dir: &Path, prefix: &str, ext: &str) -> Result<Option<PathBuf>> {
    let mut matches = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name_matches = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().starts_with(prefix));
        let ext_matches = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext));

        if path.is_file() && name_matches && ext_matches {
            matches.push(path);
        }
    }
    matches.sort();

    Ok(matches.into_iter().next())
}

#[test]
fn classify_references() {
    assert_eq!(Reference::classify("-"), Reference::Stdin);
    assert_eq!(
        Reference::classify("https://youtu.be/abc"),
        Reference::Remote("https://youtu.be/abc".into())
    );
    assert_eq!(
        Reference::classify("movie.SRT"),
        Reference::Subtitles("movie.SRT".into())
    );
    assert_eq!(
        Reference::classify("clips/movie.mp4"),
        Reference::Video("clips/movie.mp4".into())
    );
}

#[test]
fn acquire_local_subtitles() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let srt = dir.path().join("movie.srt");
    fs::write(&srt, substeg::process::EXAMPLE_SRT)?;

    let tools = Tools::default();
    let steps = Steps::new(None);
    let source = VideoSource::new(&tools, dir.path(), &steps);

    let acquired = source.acquire(&Reference::Subtitles(srt.clone()), "a.en", true)?;
    assert_eq!(acquired.subtitles, Some(srt));
    assert!(acquired.video.is_none());

    let err = source
        .acquire(&Reference::Subtitles(dir.path().join("nope.srt")), "en", true)
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SourceError>(),
        Some(SourceError::NotFound(_))
    ));
    Ok(())
}

#[test]
fn find_files_by_prefix() -> Result<()> {
    let dir = tempfile::tempdir()?;
    fs::write(dir.path().join("captions.en.srt"), "x")?;
    fs::write(dir.path().join("abc123.mp4"), "x")?;
    fs::write(dir.path().join("notes.txt"), "x")?;

    assert_eq!(
        find_file(dir.path(), "captions.", "srt")?,
        Some(dir.path().join("captions.en.srt"))
    );
    assert_eq!(
        find_file(dir.path(), "", "mp4")?,
        Some(dir.path().join("abc123.mp4"))
    );
    assert_eq!(find_file(dir.path(), "captions.", "vtt")?, None);
    assert!(is_auto_caption("a.es"));
    assert!(!is_auto_caption("es"));
    assert_eq!(file_stem(Path::new("/x/movie.mp4")), "movie");
    Ok(())
}
