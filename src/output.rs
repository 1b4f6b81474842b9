use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Builds `<stem><suffix>.<ext>` next to `input`, or inside `output_dir`
/// when one is configured.
pub fn derive_output_path(
    input: &Path,
    suffix: &str,
    ext: &str,
    output_dir: Option<&Path>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map_or_else(|| "output".into(), |s| s.to_string_lossy());
    let name = format!("{stem}{suffix}.{ext}");

    match output_dir {
        Some(dir) => dir.join(name),
        None => input.with_file_name(name),
    }
}

/// A temporary file in the destination directory that becomes `path` only
/// when [`Pending::publish`] is called. Dropping it removes the file.
pub struct Pending {
    file: NamedTempFile,
    path: PathBuf,
}

impl Pending {
    pub fn new(path: &Path) -> Result<Self> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let ext = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();

        let file = tempfile::Builder::new()
            .prefix(".pravda-")
            .suffix(&ext)
            .tempfile_in(dir)
            .with_context(|| format!("Failed to create a temporary file in {}", dir.display()))?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    /// Location external tools should write to.
    pub fn temp_path(&self) -> &Path {
        self.file.path()
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.file.write_all(data)?;
        self.file.flush()?;
        Ok(())
    }

    pub fn publish(self) -> Result<PathBuf> {
        self.file
            .persist(&self.path)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        log::debug!("Published {}", self.path.display());
        Ok(self.path)
    }
}

/// Writes `data` to `path` atomically.
pub fn publish_bytes(path: &Path, data: &[u8]) -> Result<PathBuf> {
    let mut pending = Pending::new(path)?;
    pending.write_all(data)?;
    pending.publish()
}

#[test]
fn output_paths() {
    assert_eq!(
        derive_output_path(Path::new("/v/movie.srt"), "_stego", "srt", None),
        PathBuf::from("/v/movie_stego.srt")
    );
    assert_eq!(
        derive_output_path(Path::new("/v/movie.mp4"), "_new", "mp4", Some(Path::new("/out"))),
        PathBuf::from("/out/movie_new.mp4")
    );
    assert_eq!(
        derive_output_path(Path::new("movie"), "_stego", "srt", None),
        PathBuf::from("movie_stego.srt")
    );
}

#[test]
fn publish_is_atomic() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("out.srt");

    let mut pending = Pending::new(&target)?;
    pending.write_all(b"partial")?;
    assert!(!target.exists());
    drop(pending);
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);

    assert_eq!(publish_bytes(&target, b"done")?, target);
    assert_eq!(std::fs::read(&target)?, b"done");
    Ok(())
}
