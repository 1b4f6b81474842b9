use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LANG: &str = "en";

/// Optional settings file, e.g.
///
/// ```yaml
/// ffmpeg: /opt/ffmpeg/bin/ffmpeg
/// yt_dlp: /usr/local/bin/yt-dlp
/// lang: es
/// output_dir: /srv/out
/// ```
///
/// Command line values take precedence over file values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub yt_dlp: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        log::debug!("Loaded config from {}: {config:?}", path.display());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }

    /// Caption language: command line, then config file, then `en`.
    pub fn lang(&self, cli: Option<&str>) -> String {
        cli.or(self.lang.as_deref())
            .unwrap_or(DEFAULT_LANG)
            .to_string()
    }
}

#[test]
fn parse_config() -> Result<()> {
    let config = Config::from_yaml("ffmpeg: /opt/ffmpeg\nlang: es\n")?;
    assert_eq!(config.ffmpeg.as_deref(), Some(Path::new("/opt/ffmpeg")));
    assert_eq!(config.yt_dlp, None);
    assert_eq!(config.lang(None), "es");
    assert_eq!(config.lang(Some("a.en")), "a.en");

    assert_eq!(Config::from_yaml("")?, Config::default());
    assert_eq!(Config::default().lang(None), DEFAULT_LANG);
    assert!(Config::from_yaml("colour: blue\n").is_err());
    Ok(())
}

#[test]
fn load_config_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("pravda.yaml");
    std::fs::write(&path, "output_dir: out\n")?;

    let config = Config::load(Some(&path))?;
    assert_eq!(config.output_dir.as_deref(), Some(Path::new("out")));
    assert_eq!(Config::load(None)?, Config::default());
    assert!(Config::load(Some(&dir.path().join("missing.yaml"))).is_err());
    Ok(())
}
