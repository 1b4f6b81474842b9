use std::path::PathBuf;

use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (substeg ",
    env!("SUBSTEG_VERSION"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

#[derive(Debug, ClapParser)]
#[command(
    name         = env!("CARGO_PKG_NAME"),
    version      = env!("CARGO_PKG_VERSION"),
    long_version = LONG_VERSION,
    author       = env!("CARGO_PKG_AUTHORS"),
    about        = "Hide password-keyed messages in the timing of subtitle tracks",
    long_about   = None,
)]
pub struct Cli {
    /// Set the log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub loglevel: LogLevel,

    /// Treat ordering conflicts as fatal errors (fail on first blocked bit).
    #[arg(long, global = true)]
    pub strict: bool,

    /// Log output format.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Show progress spinners during downloads and remuxing.
    #[arg(long, global = true)]
    pub progress: bool,

    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Choose an operation to perform.
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Hide a message in the subtitle timing of a video or SRT file.
    Write(WriteArgs),

    /// Reveal the message hidden in a video or SRT file.
    Read(ReadArgs),

    /// Print the capacity of a subtitle track.
    Info(InfoArgs),
}

#[derive(Debug, Args)]
pub struct SourceArgs {
    /// SRT file, video file or video URL (use "-" for SRT on stdin).
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Caption language tag; prefix with "a." for auto-generated captions.
    #[arg(short, long, value_name = "LANG")]
    pub lang: Option<String>,
}

#[derive(Debug, Args)]
pub struct WriteArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Message to hide.
    #[arg(short, long)]
    pub message: String,

    /// Output path (defaults to <name>_stego.srt or <name>_new.mp4).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Password; prompted for when not given.
    #[arg(long, env = "PRAVDA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct ReadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Password; prompted for when not given.
    #[arg(long, env = "PRAVDA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Disable logging output.
    Off,
    /// No output except errors.
    Error,
    /// Show warnings and errors.
    Warn,
    /// Show info, warnings and errors (default).
    Info,
    /// Show debug, info, warnings and errors.
    Debug,
    /// Show all log messages including trace.
    Trace,
}

impl LogLevel {
    /// Convert LogLevel to log::LevelFilter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Colorized human-readable text.
    Plain,
    /// Structured JSON per log record.
    Json,
}

#[test]
fn parse_write_command() {
    let cli = Cli::parse_from([
        "pravda", "--strict", "write", "-l", "a.en", "-m", "hello", "movie.srt",
    ]);

    assert!(cli.strict);
    let Commands::Write(args) = cli.command else {
        panic!("expected write");
    };
    assert_eq!(args.source.input, "movie.srt");
    assert_eq!(args.source.lang.as_deref(), Some("a.en"));
    assert_eq!(args.message, "hello");
}

#[test]
fn parse_read_command() {
    let cli = Cli::parse_from(["pravda", "read", "https://test.test", "--loglevel", "debug"]);

    assert!(matches!(cli.loglevel, LogLevel::Debug));
    let Commands::Read(args) = cli.command else {
        panic!("expected read");
    };
    assert_eq!(args.source.input, "https://test.test");
    assert_eq!(args.source.lang, None);
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;
    Cli::command().debug_assert();
}
