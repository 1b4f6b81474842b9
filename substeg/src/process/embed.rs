use log::{Level, debug, trace};

use crate::log_or_err;
use crate::structs::timestamp::Timestamp;
use crate::structs::timing::{Role, Timing};
use crate::utils::errors::EmbedError;

/// What happened to one message bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOutcome {
    /// The timestamp was nudged by one millisecond.
    Edited,
    /// Parity already matched the bit.
    AlreadySet,
    /// The ordering guard refused the edit; the bit reads back flipped.
    Blocked,
}

/// Per-bit outcomes of one embedding pass, in message bit order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedReport {
    pub outcomes: Vec<BitOutcome>,
}

impl EmbedReport {
    fn count(&self, outcome: BitOutcome) -> usize {
        self.outcomes.iter().filter(|&&o| o == outcome).count()
    }

    pub fn edited(&self) -> usize {
        self.count(BitOutcome::Edited)
    }

    pub fn already_set(&self) -> usize {
        self.count(BitOutcome::AlreadySet)
    }

    pub fn blocked(&self) -> usize {
        self.count(BitOutcome::Blocked)
    }

    /// Message bit indices whose edit was refused.
    pub fn blocked_bits(&self) -> impl Iterator<Item = usize> + '_ {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| **o == BitOutcome::Blocked)
            .map(|(bit, _)| bit)
    }

    pub fn is_lossless(&self) -> bool {
        self.blocked() == 0
    }
}

/// Writes message bits into timestamp parity.
///
/// The source [`Timing`] is never modified; a new sequence is returned that
/// differs only at edited positions.
pub struct Embedder {
    fail_level: Level,
}

impl Default for Embedder {
    fn default() -> Self {
        Self {
            fail_level: Level::Error,
        }
    }
}

impl Embedder {
    /// Sets the failure level for ordering conflicts.
    ///
    /// Conflicts are reported at `Warn`.
    /// - `log::Level::Error`: conflicts are logged and the bit is skipped (default)
    /// - `log::Level::Warn`: the first conflict aborts embedding (strict mode)
    pub fn set_fail_level(&mut self, level: Level) {
        self.fail_level = level;
    }

    /// Embeds `bits[i]` at endpoint `positions[i]`.
    pub fn embed(
        &self,
        source: &Timing,
        positions: &[usize],
        bits: &[u8],
    ) -> Result<(Timing, EmbedReport), EmbedError> {
        if positions.len() != bits.len() {
            return Err(EmbedError::LengthMismatch {
                bits: bits.len(),
                positions: positions.len(),
            });
        }

        let pointers = source.pointers();
        let mut output: Vec<Timestamp> = source.times().collect();
        let mut report = EmbedReport {
            outcomes: Vec::with_capacity(bits.len()),
        };

        for (bit_index, (&position, &bit)) in positions.iter().zip(bits).enumerate() {
            let Some(&current) = pointers.get(position) else {
                return Err(EmbedError::PositionOutOfRange {
                    position,
                    len: pointers.len(),
                });
            };

            if current == bit & 1 {
                report.outcomes.push(BitOutcome::AlreadySet);
                continue;
            }

            let cur = source.endpoints()[position].time;
            match nudge(&output, position, cur) {
                Some(nudged) => {
                    trace!("Bit {bit_index}: position {position} {cur} -> {nudged}");
                    output[position] = nudged;
                    report.outcomes.push(BitOutcome::Edited);
                }
                None => {
                    report.outcomes.push(BitOutcome::Blocked);
                    log_or_err!(
                        self,
                        Level::Warn,
                        EmbedError::OrderingConflict {
                            bit: bit_index,
                            position,
                        }
                    );
                }
            }
        }

        debug!(
            "Embedded {} bits: {} edited, {} already set, {} blocked",
            bits.len(),
            report.edited(),
            report.already_set(),
            report.blocked()
        );

        Ok((Timing::from_times(output), report))
    }
}

/// Returns the parity-flipped value for `position`, or `None` when the
/// ordering guard refuses the edit.
///
/// START endpoints advance and END endpoints retreat by one millisecond.
/// Neighbours come from `output`, so earlier edits are taken into account.
/// A first or last endpoint is always eligible. An interior endpoint must
/// satisfy `prev <= cur <= next` and stay within `[prev, next]` after the
/// nudge.
fn nudge(output: &[Timestamp], position: usize, cur: Timestamp) -> Option<Timestamp> {
    let nudged = match Role::from_index(position) {
        Role::Start => cur.advance(),
        Role::End => cur.retreat()?,
    };

    let prev = position.checked_sub(1).and_then(|i| output.get(i));
    let next = output.get(position + 1);

    match (prev, next) {
        (Some(&prev), Some(&next)) => {
            (prev <= cur && cur <= next && prev <= nudged && nudged <= next).then_some(nudged)
        }
        _ => Some(nudged),
    }
}

#[cfg(test)]
fn timing_ms(times: &[u64]) -> Timing {
    Timing::from_times(times.iter().copied().map(Timestamp::from_millis))
}

#[test]
fn parity_agreement() -> anyhow::Result<()> {
    use crate::process::{EXAMPLE_SRT, parse::parse, select::select};
    use crate::structs::seed::Seed;

    let source = parse(EXAMPLE_SRT)?;
    let capacity = source.capacity();
    let positions = select(&Seed::from_password("agree"), source.len(), capacity.bits)?;
    let bits: Vec<u8> = (0..capacity.bits).map(|i| ((i * 7 + 3) % 5 % 2) as u8).collect();

    let (output, report) = Embedder::default().embed(&source, &positions, &bits)?;
    assert!(report.is_lossless());
    assert_eq!(report.edited() + report.already_set(), bits.len());

    let pointers = output.pointers();
    let read: Vec<u8> = positions.iter().map(|&p| pointers[p]).collect();
    assert_eq!(read, bits);

    // The source is untouched and only edited positions differ.
    assert_eq!(source, parse(EXAMPLE_SRT)?);
    let changed = source
        .times()
        .zip(output.times())
        .filter(|(a, b)| a != b)
        .count();
    assert_eq!(changed, report.edited());
    Ok(())
}

#[test]
fn edit_direction_follows_role() -> anyhow::Result<()> {
    let source = timing_ms(&[1_000, 2_000, 3_000, 4_000]);
    let (output, report) = Embedder::default().embed(&source, &[0, 1, 2, 3], &[1, 1, 0, 1])?;

    assert_eq!(
        report.outcomes,
        [
            BitOutcome::Edited,
            BitOutcome::Edited,
            BitOutcome::AlreadySet,
            BitOutcome::Edited
        ]
    );
    let times: Vec<u64> = output.times().map(Timestamp::as_millis).collect();
    assert_eq!(times, [1_001, 1_999, 3_000, 3_999]);
    Ok(())
}

#[test]
fn last_endpoint_always_eligible() -> anyhow::Result<()> {
    // END with no successor, equal to its predecessor.
    let source = timing_ms(&[5_000, 5_000]);
    let (output, report) = Embedder::default().embed(&source, &[1], &[1])?;
    assert_eq!(report.outcomes, [BitOutcome::Edited]);
    assert_eq!(output.pointers()[1], 1);

    let source = timing_ms(&[500, 900, 1_000, 2_000]);
    let (output, report) = Embedder::default().embed(&source, &[3], &[1])?;
    assert_eq!(report.outcomes, [BitOutcome::Edited]);
    assert_eq!(output.endpoints()[3].time.as_millis(), 1_999);
    Ok(())
}

#[test]
fn guard_blocks_collisions() -> anyhow::Result<()> {
    // START equal to its END cannot advance past it.
    let source = timing_ms(&[0, 1_000, 1_000, 1_000, 2_000, 3_000]);
    let (output, report) = Embedder::default().embed(&source, &[2, 3], &[1, 1])?;
    assert_eq!(report.outcomes, [BitOutcome::Blocked, BitOutcome::Blocked]);
    assert_eq!(output, source);
    assert_eq!(report.blocked_bits().collect::<Vec<_>>(), [0, 1]);

    // Out of order input is left alone.
    let source = timing_ms(&[0, 3_000, 2_000, 4_000]);
    let (_, report) = Embedder::default().embed(&source, &[2], &[1])?;
    assert_eq!(report.outcomes, [BitOutcome::Blocked]);
    Ok(())
}

#[test]
fn earlier_edits_are_seen() -> anyhow::Result<()> {
    // START 1_000 advances to 1_001, so END 1_001 may no longer retreat.
    let source = timing_ms(&[1_000, 1_001, 2_000, 3_000]);
    let (output, report) = Embedder::default().embed(&source, &[0, 1], &[1, 0])?;
    assert_eq!(report.outcomes, [BitOutcome::Edited, BitOutcome::Blocked]);
    let times: Vec<u64> = output.times().map(Timestamp::as_millis).collect();
    assert_eq!(times, [1_001, 1_001, 2_000, 3_000]);
    Ok(())
}

#[test]
fn ordering_preserved() -> anyhow::Result<()> {
    use crate::structs::seed::Seed;
    use crate::utils::keystream::Keystream;

    let mut stream = Keystream::new(&Seed::from_password("ordering"));
    for _ in 0..20 {
        // Non-decreasing interior with frequent ties, roomy boundaries.
        let mut times = vec![0u64];
        let mut t = 10_000;
        for _ in 0..62 {
            t += stream.below(3);
            times.push(t);
        }
        times.push(t + 10_000);

        let source = timing_ms(&times);
        let positions: Vec<usize> = (0..source.len()).collect();
        let bits: Vec<u8> = source.pointers().iter().map(|p| p ^ 1).collect();

        let (output, report) = Embedder::default().embed(&source, &positions, &bits)?;
        assert!(report.edited() > 0);

        let out: Vec<Timestamp> = output.times().collect();
        assert!(out.windows(2).all(|w| w[0] <= w[1]), "{out:?}");
    }
    Ok(())
}

#[test]
fn strict_mode_fails_on_conflict() {
    let source = timing_ms(&[0, 1_000, 1_000, 1_000, 2_000, 3_000]);
    let mut embedder = Embedder::default();
    embedder.set_fail_level(Level::Warn);

    assert_eq!(
        embedder.embed(&source, &[4, 2], &[1, 1]),
        Err(EmbedError::OrderingConflict {
            bit: 1,
            position: 2
        })
    );
}

#[test]
fn mismatched_lengths() {
    let source = timing_ms(&[0, 1_000]);
    assert_eq!(
        Embedder::default().embed(&source, &[0, 1], &[1]),
        Err(EmbedError::LengthMismatch {
            bits: 1,
            positions: 2
        })
    );
    assert_eq!(
        Embedder::default().embed(&source, &[2], &[1]),
        Err(EmbedError::PositionOutOfRange { position: 2, len: 2 })
    );
}
