use log::debug;

use crate::structs::timing::Timing;
use crate::utils::bitcodec::bits_to_text;
use crate::utils::errors::EmbedError;

/// Reads the parity bits at `positions`, in position order.
pub fn extract_bits(timing: &Timing, positions: &[usize]) -> Result<Vec<u8>, EmbedError> {
    let pointers = timing.pointers();

    positions
        .iter()
        .map(|&position| {
            pointers
                .get(position)
                .copied()
                .ok_or(EmbedError::PositionOutOfRange {
                    position,
                    len: pointers.len(),
                })
        })
        .collect()
}

/// Reads the parity bits at `positions` and decodes them as text.
pub fn extract_text(timing: &Timing, positions: &[usize]) -> anyhow::Result<String> {
    let bits = extract_bits(timing, positions)?;
    debug!("Extracted {} bits", bits.len());
    Ok(bits_to_text(&bits)?)
}

#[test]
fn reads_in_position_order() -> anyhow::Result<()> {
    use crate::structs::timestamp::Timestamp;

    // parities: 1 0 0 1
    let timing = Timing::from_times([1, 2, 4, 7].map(Timestamp::from_millis));
    assert_eq!(extract_bits(&timing, &[3, 0, 1, 2])?, [1, 1, 0, 0]);
    assert!(extract_bits(&timing, &[4]).is_err());
    Ok(())
}

#[test]
fn decodes_text() -> anyhow::Result<()> {
    use crate::structs::timestamp::Timestamp;
    use crate::utils::bitcodec::text_to_bits;

    let bits = text_to_bits("Hi")?;
    let timing = Timing::from_times(bits.iter().map(|&b| Timestamp::from_millis(10 + b as u64)));
    let positions: Vec<usize> = (0..bits.len()).collect();
    assert_eq!(extract_text(&timing, &positions)?, "Hi");
    Ok(())
}
