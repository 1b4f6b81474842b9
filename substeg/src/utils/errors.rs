#[macro_export]
macro_rules! log_or_err {
    ($state:expr, $level:expr, $err:expr $(,)?) => {{
        if $level <= $state.fail_level {
            return Err($err);
        } else {
            match $level {
                ::log::Level::Error => ::log::error!("{}", $err),
                ::log::Level::Warn => ::log::warn!("{}", $err),
                ::log::Level::Info => ::log::info!("{}", $err),
                ::log::Level::Debug => ::log::debug!("{}", $err),
                ::log::Level::Trace => ::log::trace!("{}", $err),
            }
        }
    }};
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("No SubRip timing line found")]
    NoTimingLines,

    #[error("Malformed timing line at line {line}: {content:?}")]
    MalformedTiming { line: usize, content: String },

    #[error("Timestamp field out of range at line {line}: {content:?}")]
    TimestampOutOfRange { line: usize, content: String },

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Subtitle data is not valid UTF-8 (byte offset {0})")]
    InvalidUtf8(usize),
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("Character {ch:?} at offset {offset} cannot be encoded as Latin-1")]
    Unencodable { ch: char, offset: usize },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("Cannot select {requested} distinct positions from a pool of {available}")]
    TooManyPositions { requested: usize, available: usize },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CapacityError {
    #[error("Message needs {requested} chars but the track can carry at most {capacity}")]
    Exceeded { requested: usize, capacity: usize },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum EmbedError {
    #[error("Ordering guard blocked bit {bit} at timestamp position {position}")]
    OrderingConflict { bit: usize, position: usize },

    #[error("Bit count {bits} does not match position count {positions}")]
    LengthMismatch { bits: usize, positions: usize },

    #[error("Position {position} is outside the endpoint pool of {len}")]
    PositionOutOfRange { position: usize, len: usize },
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RewriteError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Timing line {line} needs endpoints that are not available ({available} in total)")]
    EndpointsExhausted { line: usize, available: usize },

    #[error("{unused} endpoints were left over after rewriting")]
    EndpointsLeftOver { unused: usize },
}
