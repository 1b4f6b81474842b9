use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::MultiProgress;
use substeg::process::{Hidden, Stego};

use super::command::{Cli, WriteArgs};
use super::progress::Steps;
use super::{fail_level, password_seed, read_subtitles};
use crate::config::Config;
use crate::mux::Muxer;
use crate::output::{Pending, derive_output_path, publish_bytes};
use crate::source::{Reference, VideoSource};
use crate::tool::Tools;

pub fn cmd_write(
    args: &WriteArgs,
    cli: &Cli,
    config: &Config,
    multi: Option<&MultiProgress>,
) -> Result<()> {
    let reference = Reference::classify(&args.source.input);
    let lang = config.lang(args.source.lang.as_deref());
    let seed = password_seed(args.password.as_deref(), reference == Reference::Stdin)?;

    // Removed on every exit path, errors included
    let workdir = tempfile::tempdir().context("Failed to create a working directory")?;
    let tools = Tools::from_config(config);
    let steps = Steps::new(multi);
    let source = VideoSource::new(&tools, workdir.path(), &steps);

    let acquired = source.acquire(&reference, &lang, true)?;
    let srt = read_subtitles(&acquired)?;

    let mut stego = Stego::new(seed);
    stego.set_fail_level(fail_level(cli));
    let hidden = stego.hide(&srt, &args.message)?;
    log_report(&hidden);

    let output_dir = config.output_dir.as_deref();

    match (&reference, &acquired.video) {
        (Reference::Stdin, _) => match &args.output {
            Some(path) => announce(publish_bytes(path, hidden.srt.as_bytes())?),
            None => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(hidden.srt.as_bytes())?;
                stdout.flush()?;
            }
        },
        (_, Some(video)) => {
            let base = video_base(&reference, video);
            let out = args
                .output
                .clone()
                .unwrap_or_else(|| derive_output_path(&base, "_new", "mp4", output_dir));

            let stego_srt = workdir.path().join("stego.srt");
            std::fs::write(&stego_srt, hidden.srt.as_bytes())?;

            let muxer = Muxer::new(tools.ffmpeg()?);
            let pending = Pending::new(&out)?;
            steps.run("Attaching captions", || {
                muxer
                    .attach_subtitles(video, &stego_srt, pending.temp_path())
                    .context("Failed to attach the rewritten captions")
            })?;
            announce(pending.publish()?);
        }
        (_, None) => {
            let subtitles = acquired
                .subtitles
                .as_deref()
                .context("No caption file was acquired")?;
            let out = args
                .output
                .clone()
                .unwrap_or_else(|| derive_output_path(subtitles, "_stego", "srt", output_dir));
            announce(publish_bytes(&out, hidden.srt.as_bytes())?);
        }
    }

    Ok(())
}

/// Naming base for the output video. Downloads live in the working
/// directory, so their output goes to the current directory instead.
fn video_base(reference: &Reference, video: &Path) -> PathBuf {
    match reference {
        Reference::Remote(_) => Path::new(".").join(video.file_name().unwrap_or_default()),
        _ => video.to_path_buf(),
    }
}

fn log_report(hidden: &Hidden) {
    let report = &hidden.report;
    log::debug!(
        "Embedding: {} edited, {} already set, {} blocked",
        report.edited(),
        report.already_set(),
        report.blocked()
    );
    for bit in report.blocked_bits() {
        log::trace!("Bit {bit} was blocked by its neighbours");
    }
}

fn announce(path: PathBuf) {
    log::info!("Wrote {}", path.display());
}

#[test]
fn remote_output_lands_in_current_dir() {
    let video = Path::new("/tmp/.tmpXYZ/abc123.mp4");
    assert_eq!(
        video_base(&Reference::Remote("https://test.test".into()), video),
        PathBuf::from("./abc123.mp4")
    );
    assert_eq!(
        video_base(&Reference::Video(video.into()), video),
        video.to_path_buf()
    );
}

#[test]
fn write_local_srt() -> Result<()> {
    use crate::cli::command::Commands;
    use clap::Parser as ClapParser;

    let dir = tempfile::tempdir()?;
    let input = dir.path().join("movie.srt");
    std::fs::write(&input, substeg::process::EXAMPLE_SRT)?;

    let input = input.to_string_lossy().into_owned();
    let cli = Cli::parse_from([
        "pravda",
        "write",
        "-m",
        "abc",
        "--password",
        "tests",
        input.as_str(),
    ]);
    let Commands::Write(args) = &cli.command else {
        panic!("expected write");
    };

    cmd_write(args, &cli, &Config::default(), None)?;

    let written = std::fs::read_to_string(dir.path().join("movie_stego.srt"))?;
    let seed = substeg::structs::seed::Seed::from_password("tests");
    assert!(Stego::new(seed).reveal(&written)?.starts_with("abc"));
    Ok(())
}

#[test]
fn over_capacity_writes_nothing() -> Result<()> {
    use crate::cli::command::Commands;
    use clap::Parser as ClapParser;
    use substeg::utils::errors::CapacityError;

    let dir = tempfile::tempdir()?;
    let input = dir.path().join("movie.srt");
    std::fs::write(&input, substeg::process::EXAMPLE_SRT)?;

    let input = input.to_string_lossy().into_owned();
    let cli = Cli::parse_from([
        "pravda",
        "write",
        "-m",
        "far too long",
        "--password",
        "tests",
        input.as_str(),
    ]);
    let Commands::Write(args) = &cli.command else {
        panic!("expected write");
    };

    let err = cmd_write(args, &cli, &Config::default(), None).unwrap_err();
    assert!(err.is::<CapacityError>());

    assert!(!dir.path().join("movie_stego.srt").exists());
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 1);
    Ok(())
}
