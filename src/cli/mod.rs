use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::Level;
use substeg::structs::seed::Seed;

use crate::input::InputReader;
use crate::source::Acquired;
use command::Cli;

pub mod command;
pub mod info;
pub mod progress;
pub mod read;
pub mod write;

/// Failure level for ordering conflicts, following `--strict`.
pub fn fail_level(cli: &Cli) -> Level {
    if cli.strict { Level::Warn } else { Level::Error }
}

/// Hashes the given password, or prompts for one on stderr.
///
/// Prompting reads stdin, so it is refused when the subtitles themselves
/// arrive on stdin.
pub fn password_seed(password: Option<&str>, stdin_busy: bool) -> Result<Seed> {
    if let Some(password) = password {
        return Ok(Seed::from_password(password));
    }
    if stdin_busy {
        bail!("Set PRAVDA_PASSWORD or pass --password when reading subtitles from stdin");
    }

    eprint!("Password: ");
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']);

    if password.is_empty() {
        bail!("An empty password is not allowed");
    }

    Ok(Seed::from_password(password))
}

/// Reads the acquired caption file, or stdin when there is none.
pub fn read_subtitles(acquired: &Acquired) -> Result<String> {
    let path = acquired
        .subtitles
        .as_deref()
        .unwrap_or_else(|| Path::new("-"));
    InputReader::new(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .read_subtitles()
}

#[test]
fn seed_from_argument() -> Result<()> {
    assert_eq!(
        password_seed(Some("tests"), true)?.to_hex(),
        "59830ebc3a4184110566bf1a290d08473dfdcbd492ce498b14cd1a5e2fa2e441"
    );
    assert!(password_seed(None, true).is_err());
    Ok(())
}
