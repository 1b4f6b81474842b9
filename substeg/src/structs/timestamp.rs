//! SubRip timestamp structures
//!
//! `HH:MM:SS,mmm` instants as they appear on SRT timing lines.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::utils::errors::ParseError;

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Millisecond precision SRT instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp {
    millis: u64,
}

impl Timestamp {
    pub const ZERO: Self = Self { millis: 0 };

    pub const fn from_millis(millis: u64) -> Self {
        Self { millis }
    }

    pub fn from_parts(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<Self> {
        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return None;
        }

        Some(Self {
            millis: hours * MS_PER_HOUR + minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis,
        })
    }

    pub const fn as_millis(self) -> u64 {
        self.millis
    }

    pub const fn hours(self) -> u64 {
        self.millis / MS_PER_HOUR
    }

    pub const fn minutes(self) -> u64 {
        (self.millis % MS_PER_HOUR) / MS_PER_MINUTE
    }

    pub const fn seconds(self) -> u64 {
        (self.millis % MS_PER_MINUTE) / MS_PER_SECOND
    }

    /// The `mmm` field.
    pub const fn subsec_millis(self) -> u64 {
        self.millis % MS_PER_SECOND
    }

    /// Parity of the last decimal digit of the millisecond field.
    pub const fn parity(self) -> u8 {
        (self.subsec_millis() % 10 % 2) as u8
    }

    pub const fn advance(self) -> Self {
        Self {
            millis: self.millis + 1,
        }
    }

    /// One millisecond earlier, or `None` at `00:00:00,000`.
    pub fn retreat(self) -> Option<Self> {
        self.millis.checked_sub(1).map(Self::from_millis)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0width$}:{:02}:{:02},{:03}",
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.subsec_millis(),
            width = if self.hours() >= 100 { 0 } else { 2 }
        )
    }
}

impl FromStr for Timestamp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidTimestamp(s.to_string());

        let (hms, millis) = s.split_once(',').ok_or_else(invalid)?;
        let mut fields = hms.split(':');
        let (Some(hours), Some(minutes), Some(seconds), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(invalid());
        };

        let digits = |field: &str, min_len: usize, max_len: usize| -> Result<u64, ParseError> {
            if field.len() < min_len
                || field.len() > max_len
                || !field.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(invalid());
            }
            field.parse().map_err(|_| invalid())
        };

        Self::from_parts(
            digits(hours, 2, 10)?,
            digits(minutes, 2, 2)?,
            digits(seconds, 2, 2)?,
            digits(millis, 3, 3)?,
        )
        .ok_or_else(invalid)
    }
}

#[test]
fn print_timestamp() {
    let timestamp = Timestamp::from_parts(2, 34, 56, 789).unwrap();
    assert_eq!(format!("{timestamp}"), "02:34:56,789");
    assert_eq!(format!("{}", Timestamp::ZERO), "00:00:00,000");
    assert_eq!(
        format!("{}", Timestamp::from_parts(123, 0, 1, 2).unwrap()),
        "123:00:01,002"
    );
}

#[test]
fn parse_timestamp() {
    let timestamp: Timestamp = "01:02:03,045".parse().unwrap();
    assert_eq!(timestamp.as_millis(), 3_723_045);
    assert_eq!(timestamp.subsec_millis(), 45);
    assert_eq!(timestamp.parity(), 1);
    assert_eq!(timestamp.to_string(), "01:02:03,045");

    assert!("01:60:00,000".parse::<Timestamp>().is_err());
    assert!("01:00:60,000".parse::<Timestamp>().is_err());
    assert!("01:00:00.000".parse::<Timestamp>().is_err());
    assert!("1:00:00,000".parse::<Timestamp>().is_err());
    assert!("01:00:00,00".parse::<Timestamp>().is_err());
    assert!("01:00:00:00,000".parse::<Timestamp>().is_err());
}

#[test]
fn nudge_flips_parity() {
    let timestamp: Timestamp = "00:00:01,999".parse().unwrap();
    assert_eq!(timestamp.parity(), 1);
    assert_eq!(timestamp.advance().to_string(), "00:00:02,000");
    assert_eq!(timestamp.advance().parity(), 0);
    assert_eq!(timestamp.retreat().unwrap().parity(), 0);
    assert_eq!(Timestamp::ZERO.retreat(), None);
}
