use anyhow::{Context, Result};
use indicatif::MultiProgress;
use substeg::process::Stego;

use super::command::{Cli, ReadArgs};
use super::{password_seed, read_subtitles};
use super::progress::Steps;
use crate::config::Config;
use crate::source::{Reference, VideoSource};
use crate::tool::Tools;

pub fn cmd_read(
    args: &ReadArgs,
    _cli: &Cli,
    config: &Config,
    multi: Option<&MultiProgress>,
) -> Result<()> {
    let message = reveal(args, config, multi)?;
    println!("{message}");
    Ok(())
}

/// Recovers the full-capacity text, filler included.
///
/// Captions are read as stored in the container; the write path already
/// normalized them before embedding.
fn reveal(args: &ReadArgs, config: &Config, multi: Option<&MultiProgress>) -> Result<String> {
    let reference = Reference::classify(&args.source.input);
    let lang = config.lang(args.source.lang.as_deref());
    let seed = password_seed(args.password.as_deref(), reference == Reference::Stdin)?;

    let workdir = tempfile::tempdir().context("Failed to create a working directory")?;
    let tools = Tools::from_config(config);
    let steps = Steps::new(multi);
    let acquired =
        VideoSource::new(&tools, workdir.path(), &steps).acquire(&reference, &lang, false)?;

    let srt = read_subtitles(&acquired)?;

    let message = Stego::new(seed).reveal(&srt)?;
    log::debug!("Revealed {} chars", message.chars().count());

    Ok(message)
}

#[test]
fn read_back_written_srt() -> Result<()> {
    use crate::cli::command::SourceArgs;
    use substeg::structs::seed::Seed;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("movie_stego.srt");
    let hidden =
        Stego::new(Seed::from_password("tests")).hide(substeg::process::EXAMPLE_SRT, "Hey")?;
    std::fs::write(&path, &hidden.srt)?;

    let args = ReadArgs {
        source: SourceArgs {
            input: path.to_string_lossy().into_owned(),
            lang: None,
        },
        password: Some("tests".into()),
    };
    assert!(reveal(&args, &Config::default(), None)?.starts_with("Hey"));

    let wrong = ReadArgs {
        password: Some("other".into()),
        ..args
    };
    assert!(!reveal(&wrong, &Config::default(), None)?.starts_with("Hey"));
    Ok(())
}
