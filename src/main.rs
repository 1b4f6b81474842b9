use anyhow::Result;
use clap::Parser as ClapParser;
use indicatif::MultiProgress;
use indicatif_log_bridge::LogWrapper;

use cli::command::{Cli, Commands, LogFormat};
use cli::info::cmd_info;
use cli::read::cmd_read;
use cli::write::cmd_write;
use config::Config;

mod cli;
mod config;
mod input;
mod mux;
mod output;
mod source;
mod tool;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_level = cli.loglevel.to_level_filter();

    let multi = MultiProgress::new();

    let mut env_builder = env_logger::Builder::from_default_env();
    env_builder.filter_level(base_level);
    match cli.log_format {
        LogFormat::Plain => {
            env_builder.format_timestamp_secs();
        }
        LogFormat::Json => {
            env_builder.format(|buf, record| {
                use std::io::Write;
                writeln!(
                    buf,
                    "{{\"ts\":\"{}\",\"lvl\":\"{}\",\"msg\":{:?}}}",
                    buf.timestamp(),
                    record.level(),
                    record.args().to_string()
                )
            });
        }
    }

    let pb = if cli.progress {
        let logger = env_builder.build();
        LogWrapper::new(multi.clone(), logger).try_init()?;
        Some(&multi)
    } else {
        env_builder.try_init()?;
        None
    };

    if let Some(describe) = option_env!("VERGEN_GIT_DESCRIBE") {
        log::debug!("pravda {describe}");
    }

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Write(ref args) => cmd_write(args, &cli, &config, pb)?,
        Commands::Read(ref args) => cmd_read(args, &cli, &config, pb)?,
        Commands::Info(ref args) => cmd_info(args, &cli, &config, pb)?,
    }

    Ok(())
}
