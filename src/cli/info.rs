use anyhow::{Context, Result};
use indicatif::MultiProgress;
use substeg::process::Stego;
use substeg::structs::timing::Capacity;

use super::command::{Cli, InfoArgs};
use super::progress::Steps;
use super::read_subtitles;
use crate::config::Config;
use crate::source::{Reference, VideoSource};
use crate::tool::Tools;

pub fn cmd_info(
    args: &InfoArgs,
    _cli: &Cli,
    config: &Config,
    multi: Option<&MultiProgress>,
) -> Result<()> {
    log::info!("Analyzing subtitle track: {}", args.source.input);

    let reference = Reference::classify(&args.source.input);
    let lang = config.lang(args.source.lang.as_deref());

    let workdir = tempfile::tempdir().context("Failed to create a working directory")?;
    let tools = Tools::from_config(config);
    let steps = Steps::new(multi);
    let acquired =
        VideoSource::new(&tools, workdir.path(), &steps).acquire(&reference, &lang, true)?;

    let srt = read_subtitles(&acquired)?;
    let capacity = Stego::capacity(&srt)?;

    print_info(&args.source.input, &lang, &capacity);

    if capacity.chars == 0 {
        println!("This track is too short to carry a message.");
    }

    Ok(())
}

fn print_info(input: &str, lang: &str, capacity: &Capacity) {
    println!();
    println!("Subtitle Track Information");
    println!("==========================");
    println!();
    println!("  Source                    {input}");
    println!("  Language                  {lang}");
    println!("  Subtitle blocks           {}", capacity.pointers / 2);
    println!("  Timestamps                {}", capacity.pointers);
    println!("  Capacity                  {} chars", capacity.chars);
    println!("  Bits used                 {}", capacity.bits);
    println!();
}
