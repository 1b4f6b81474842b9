//! Text to bit sequence conversion.
//!
//! Messages travel as Latin-1 bytes, one byte per character, serialized
//! most-significant bit first. A bit is stored as a `u8` holding 0 or 1 so
//! it compares directly against timestamp parity.

use std::io::{self, Cursor};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::utils::errors::CodecError;

/// Bytes removed from decoded text. They only ever appear as packing
/// artifacts and never as message content.
pub const STRIPPED_CONTROLS: [u8; 5] = [0x07, 0x08, 0x09, 0x0A, 0x0D];

/// Encodes `text` as Latin-1, one byte per character.
pub fn latin1_bytes(text: &str) -> Result<Vec<u8>, CodecError> {
    text.chars()
        .enumerate()
        .map(|(offset, ch)| u8::try_from(ch).map_err(|_| CodecError::Unencodable { ch, offset }))
        .collect()
}

/// Converts `text` to its bit sequence, MSB first per byte.
///
/// ```
/// use substeg::utils::bitcodec::text_to_bits;
///
/// let bits = text_to_bits("t")?;
/// assert_eq!(bits, [0, 1, 1, 1, 0, 1, 0, 0]);
/// # Ok::<(), substeg::utils::errors::CodecError>(())
/// ```
pub fn text_to_bits(text: &str) -> Result<Vec<u8>, CodecError> {
    let bytes = latin1_bytes(text)?;
    let bit_len = bytes.len() * 8;
    let mut reader = BitReader::<_, BigEndian>::new(Cursor::new(bytes));

    Ok((0..bit_len)
        .map_while(|_| reader.read_bit().ok())
        .map(u8::from)
        .collect())
}

/// Packs bits MSB first into `ceil(len / 8)` bytes. A trailing partial byte
/// is left-aligned and zero-filled.
pub fn bits_to_bytes(bits: &[u8]) -> io::Result<Vec<u8>> {
    let mut writer = BitWriter::<_, BigEndian>::new(Vec::with_capacity(bits.len().div_ceil(8)));

    for &bit in bits {
        writer.write_bit(bit & 1 != 0)?;
    }
    writer.byte_align()?;

    Ok(writer.into_writer())
}

/// Converts a bit sequence back to text, dropping [`STRIPPED_CONTROLS`].
pub fn bits_to_text(bits: &[u8]) -> io::Result<String> {
    Ok(bits_to_bytes(bits)?
        .into_iter()
        .filter(|byte| !STRIPPED_CONTROLS.contains(byte))
        .map(char::from)
        .collect())
}

/// Returns `len` uniformly chosen ASCII alphanumeric characters.
///
/// The output is filler only; it is drawn from the thread-local generator
/// and is not reproducible.
pub fn random_filler(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[test]
fn tests_message_bits() -> anyhow::Result<()> {
    let expected: Vec<u8> = vec![
        0, 1, 1, 1, 0, 1, 0, 0, // t
        0, 1, 1, 0, 0, 1, 0, 1, // e
        0, 1, 1, 1, 0, 0, 1, 1, // s
        0, 1, 1, 1, 0, 1, 0, 0, // t
        0, 1, 1, 1, 0, 0, 1, 1, // s
    ];

    assert_eq!(latin1_bytes("tests")?, [0x74, 0x65, 0x73, 0x74, 0x73]);
    assert_eq!(text_to_bits("tests")?, expected);
    assert_eq!(bits_to_text(&expected)?, "tests");
    Ok(())
}

#[test]
fn latin1_round_trip() -> anyhow::Result<()> {
    for text in ["", "a", "Hola, señor!", "ÿ\u{0}~ 0123", "Zürich ¿qué?"] {
        assert_eq!(bits_to_text(&text_to_bits(text)?)?, text);
    }
    Ok(())
}

#[test]
fn control_bytes_are_stripped() -> anyhow::Result<()> {
    let bits = text_to_bits("a\tb\nc\rd\u{7}e\u{8}f")?;
    assert_eq!(bits_to_text(&bits)?, "abcdef");
    Ok(())
}

#[test]
fn partial_byte_is_zero_filled() -> anyhow::Result<()> {
    // 0b0100_0 -> 0b0100_0000 ('@')
    assert_eq!(bits_to_bytes(&[0, 1, 0, 0, 0])?, [0x40]);
    assert_eq!(bits_to_text(&[0, 1, 0, 0, 0])?, "@");
    assert!(bits_to_bytes(&[])?.is_empty());
    Ok(())
}

#[test]
fn rejects_non_latin1() {
    assert_eq!(
        text_to_bits("ok€"),
        Err(CodecError::Unencodable { ch: '€', offset: 2 })
    );
}

#[test]
fn filler_is_alphanumeric() {
    let filler = random_filler(3);
    assert_eq!(filler.len(), 3);
    assert!(filler.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(random_filler(0).is_empty());
}
