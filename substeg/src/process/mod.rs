use anyhow::{Result, bail};
use log::{Level, debug, info};

use crate::structs::seed::Seed;
use crate::structs::timing::Capacity;
use crate::utils::bitcodec::{random_filler, text_to_bits};
use crate::utils::errors::{CapacityError, ParseError};

/// Timing line parsing.
///
/// Provides [`parse`](parse::parse) for turning SubRip text into the ordered
/// [`Timing`](crate::structs::timing::Timing) endpoint sequence.
pub mod parse;

/// Password-keyed position selection.
///
/// Provides [`select`](select::select), the pinned mapping from
/// `(seed, pool, count)` to an ordered set of endpoint positions.
pub mod select;

/// Parity embedding.
///
/// Provides the [`Embedder`](embed::Embedder) that nudges timestamps so their
/// parity carries message bits, guarded against reordering.
pub mod embed;

/// Parity extraction.
pub mod extract;

/// SubRip serialization with updated timing lines.
pub mod rewrite;

pub const EXAMPLE_SRT: &str = "\
1
00:00:01,000 --> 00:00:03,517
Where were you last night?

2
00:00:04,102 --> 00:00:06,833
At the harbour, watching the boats.

3
00:00:07,240 --> 00:00:09,918
All night?

4
00:00:10,375 --> 00:00:12,046
Most of it.

5
00:00:12,600 --> 00:00:15,271
They found the car
by the old customs house.

6
00:00:15,889 --> 00:00:18,004
Then they know more than I do.

7
00:00:18,452 --> 00:00:20,739
Nobody knows more than you do.

8
00:00:21,016 --> 00:00:23,380
That used to be a compliment.

9
00:00:23,967 --> 00:00:26,125
It still is.

10
00:00:26,540 --> 00:00:29,093
Then why does it sound like a warning?

11
00:00:29,608 --> 00:00:31,777
Because tonight it is one.

12
00:00:32,210 --> 00:00:34,869
I'll be careful.

13
00:00:35,334 --> 00:00:37,452
You said that last time.

14
00:00:38,001 --> 00:00:40,628
And I came back.

15
00:00:41,187 --> 00:00:43,950
Barely.

16
00:00:44,413 --> 00:00:47,066
Barely counts.
";

/// Result of hiding a message in a subtitle track.
#[derive(Debug, Clone)]
pub struct Hidden {
    /// The rewritten SubRip text.
    pub srt: String,
    pub report: embed::EmbedReport,
    pub capacity: Capacity,
}

/// Hides and reveals messages in SubRip timing.
///
/// # Example
///
/// ```rust
/// use substeg::process::{EXAMPLE_SRT, Stego};
/// use substeg::structs::seed::Seed;
///
/// let stego = Stego::new(Seed::from_password("hunter2"));
///
/// let hidden = stego.hide(EXAMPLE_SRT, "Hi!")?;
/// assert!(hidden.report.is_lossless());
///
/// // The track carries 4 characters; the rest is random filler.
/// let revealed = stego.reveal(&hidden.srt)?;
/// assert!(revealed.starts_with("Hi!"));
/// assert_eq!(revealed.len(), 4);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Stego {
    seed: Seed,
    fail_level: Level,
}

impl Stego {
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            fail_level: Level::Error,
        }
    }

    /// Sets the failure level for ordering conflicts while hiding.
    ///
    /// - `log::Level::Error`: blocked bits are logged, hiding succeeds (default)
    /// - `log::Level::Warn`: any blocked bit aborts hiding (strict mode)
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Capacity of `srt`. A track without timing lines has none.
    pub fn capacity(srt: &str) -> Result<Capacity> {
        match parse::parse(srt) {
            Ok(timing) => Ok(timing.capacity()),
            Err(ParseError::NoTimingLines) => Ok(Capacity::for_pointers(0)),
            Err(e) => Err(e.into()),
        }
    }

    /// Hides `message` in the timing of `srt`.
    ///
    /// The message is padded with random alphanumeric filler up to the full
    /// capacity of the track, so every track always carries the same number
    /// of bits.
    pub fn hide(&self, srt: &str, message: &str) -> Result<Hidden> {
        let timing = match parse::parse(srt) {
            Ok(timing) => timing,
            Err(ParseError::NoTimingLines) => crate::structs::timing::Timing::default(),
            Err(e) => return Err(e.into()),
        };
        let capacity = timing.capacity();

        let requested = message.chars().count();
        debug!("Using {requested} of {} chars", capacity.chars);

        if requested > capacity.chars {
            bail!(CapacityError::Exceeded {
                requested,
                capacity: capacity.chars,
            });
        }

        let padded = format!("{message}{}", random_filler(capacity.chars - requested));
        let bits = text_to_bits(&padded)?;
        debug_assert_eq!(bits.len(), capacity.bits);

        let positions = select::select(&self.seed, timing.len(), capacity.bits)?;

        let mut embedder = embed::Embedder::default();
        embedder.set_fail_level(self.fail_level);
        let (edited, report) = embedder.embed(&timing, &positions, &bits)?;

        if !report.is_lossless() {
            log::warn!(
                "{} of {} bits could not be embedded and will read back flipped",
                report.blocked(),
                capacity.bits
            );
        }

        let srt = rewrite::rewrite(srt, &edited)?;
        info!(
            "Hid {requested} chars ({} timestamps edited, capacity {capacity})",
            report.edited()
        );

        Ok(Hidden {
            srt,
            report,
            capacity,
        })
    }

    /// Recovers the full-capacity text hidden in `srt`, filler included.
    pub fn reveal(&self, srt: &str) -> Result<String> {
        let timing = parse::parse(srt)?;
        let capacity = timing.capacity();
        let positions = select::select(&self.seed, timing.len(), capacity.bits)?;

        debug!("Reading {} bits from {} pointers", capacity.bits, capacity.pointers);

        Ok(extract::extract_text(&timing, &positions)?)
    }
}

#[test]
fn hide_and_reveal() -> Result<()> {
    let stego = Stego::new(Seed::from_password("tests"));
    let hidden = stego.hide(EXAMPLE_SRT, "Hi!")?;

    assert_eq!(hidden.capacity, Capacity::for_pointers(32));
    assert!(hidden.report.is_lossless());
    assert_eq!(hidden.report.outcomes.len(), 32);

    let revealed = stego.reveal(&hidden.srt)?;
    assert_eq!(revealed.chars().count(), 4);
    assert!(revealed.starts_with("Hi!"));
    assert!(revealed.chars().nth(3).is_some_and(|c| c.is_ascii_alphanumeric()));

    let wrong = Stego::new(Seed::from_password("test"));
    assert!(!wrong.reveal(&hidden.srt)?.starts_with("Hi!"));
    Ok(())
}

#[test]
fn full_capacity_message() -> Result<()> {
    let stego = Stego::new(Seed::from_password("full"));
    let hidden = stego.hide(EXAMPLE_SRT, "Ñu 1")?;
    assert_eq!(stego.reveal(&hidden.srt)?, "Ñu 1");
    Ok(())
}

#[test]
fn only_timing_lines_change() -> Result<()> {
    let hidden = Stego::new(Seed::from_password("tests")).hide(EXAMPLE_SRT, "abcd")?;

    let before: Vec<&str> = EXAMPLE_SRT.lines().collect();
    let after: Vec<&str> = hidden.srt.lines().collect();
    assert_eq!(before.len(), after.len());

    let mut changed = 0;
    for (a, b) in before.iter().zip(&after) {
        if a.contains("-->") {
            changed += usize::from(a != b);
        } else {
            assert_eq!(a, b);
        }
    }
    assert!(changed > 0);
    Ok(())
}

#[test]
fn capacity_exceeded() {
    let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:03,000 --> 00:00:04,000\n";
    assert_eq!(Stego::capacity(srt).map(|c| c.chars).ok(), Some(0));

    let err = Stego::new(Seed::from_password("tests"))
        .hide(srt, "a")
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<CapacityError>(),
        Some(&CapacityError::Exceeded {
            requested: 1,
            capacity: 0
        })
    );

    let err = Stego::new(Seed::from_password("tests"))
        .hide(EXAMPLE_SRT, "toolong")
        .unwrap_err();
    assert!(err.downcast_ref::<CapacityError>().is_some());
}

#[test]
fn empty_message_fits_empty_track() -> Result<()> {
    let srt = "1\n00:00:01,000 --> 00:00:02,000\n\n";
    let hidden = Stego::new(Seed::from_password("tests")).hide(srt, "")?;

    assert_eq!(hidden.capacity.chars, 0);
    assert_eq!(hidden.srt, srt);
    assert!(hidden.report.outcomes.is_empty());
    Ok(())
}

#[test]
fn no_timing_lines() {
    let stego = Stego::new(Seed::from_password("tests"));
    assert_eq!(Stego::capacity("hello\n").map(|c| c.pointers).ok(), Some(0));
    assert!(stego.hide("hello\n", "a").unwrap_err().is::<CapacityError>());
    assert_eq!(
        stego.reveal("hello\n").unwrap_err().downcast_ref::<ParseError>(),
        Some(&ParseError::NoTimingLines)
    );
}

#[test]
fn strict_mode_rejects_blocked_bits() -> Result<()> {
    use crate::utils::errors::EmbedError;

    // Every endpoint ties with its neighbours, so interior edits are refused.
    let mut srt = String::new();
    for i in 1..=8 {
        srt.push_str(&format!("{i}\n00:00:05,000 --> 00:00:05,000\nx\n\n"));
    }

    let lenient = Stego::new(Seed::from_password("tests"));
    let hidden = lenient.hide(&srt, "ab")?;
    assert!(!hidden.report.is_lossless());

    let mut strict = Stego::new(Seed::from_password("tests"));
    strict.set_fail_level(Level::Warn);
    let err = strict.hide(&srt, "ab").unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EmbedError>(),
        Some(EmbedError::OrderingConflict { .. })
    ));
    Ok(())
}
