use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use substeg::process::parse::decode_text;

/// Unified input reader that handles both file and pipe input with buffered reading
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
}

impl InputReader {
    /// Create a new InputReader from a path
    /// Use "-" for stdin pipe input
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path_str = input_path.as_ref().to_string_lossy();
        let is_pipe = path_str == "-";

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(input_path)?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    /// Wrap an arbitrary reader.
    pub fn from_reader(reader: impl Read + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            is_pipe: false,
        }
    }

    /// Check if this is pipe input
    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// Read all remaining data
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read the whole input as SubRip text (UTF-8, byte-order mark removed).
    pub fn read_subtitles(&mut self) -> Result<String> {
        let data = self.read_all()?;
        let text = decode_text(&data).context(if self.is_pipe {
            "Subtitles on stdin are not valid UTF-8"
        } else {
            "Subtitle file is not valid UTF-8"
        })?;

        log::debug!("Read {} bytes of subtitles", data.len());
        Ok(text.to_string())
    }
}

#[test]
fn read_subtitle_text() -> Result<()> {
    let data = b"\xEF\xBB\xBF1\n00:00:01,000 --> 00:00:02,000\nHi\n".to_vec();
    let text = InputReader::from_reader(io::Cursor::new(data)).read_subtitles()?;
    assert!(text.starts_with("1\n00:00:01,000"));

    let bad = InputReader::from_reader(io::Cursor::new(vec![0xC3, 0x28])).read_subtitles();
    assert!(bad.is_err());
    Ok(())
}

#[test]
fn read_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("a.srt");
    std::fs::write(&path, "x")?;

    let mut reader = InputReader::new(&path)?;
    assert!(!reader.is_pipe());
    assert_eq!(reader.read_all()?, b"x");
    assert!(InputReader::new(dir.path().join("missing.srt")).is_err());
    Ok(())
}
