//! Counter-mode SHA-256 keystream.
//!
//! Block `j` of the stream is `SHA-256(seed || u64_be(j))`. Words are taken
//! big-endian from consecutive stream bytes. The construction is fully
//! pinned so that any two builds derive identical positions from the same
//! password.

use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::structs::seed::Seed;

const BLOCK_LEN: usize = 32;

/// Deterministic generator keyed by a [`Seed`].
///
/// Each selection owns its own instance; there is no shared state between
/// calls.
#[derive(Clone)]
pub struct Keystream {
    seed: [u8; Seed::LEN],
    counter: u64,
    block: [u8; BLOCK_LEN],
    offset: usize,
}

impl Keystream {
    pub fn new(seed: &Seed) -> Self {
        Self {
            seed: *seed.as_bytes(),
            counter: 0,
            block: [0; BLOCK_LEN],
            offset: BLOCK_LEN,
        }
    }

    fn refill(&mut self) {
        let mut hasher = Sha256::new();
        hasher.update(self.seed);
        hasher.update(self.counter.to_be_bytes());
        self.block = hasher.finalize().into();
        self.counter = self.counter.wrapping_add(1);
        self.offset = 0;
    }

    fn next_byte(&mut self) -> u8 {
        if self.offset == BLOCK_LEN {
            self.refill();
        }
        let byte = self.block[self.offset];
        self.offset += 1;
        byte
    }

    /// Uniform value in `[0, range)` by rejection sampling.
    ///
    /// Draws below `2^64 - (2^64 mod range)` are accepted, so every residue
    /// is equally likely.
    pub fn below(&mut self, range: u64) -> u64 {
        debug_assert!(range > 0);
        let rem = (u64::MAX % range + 1) % range;
        let accept_max = u64::MAX - rem;

        loop {
            let value = self.next_u64();
            if value <= accept_max {
                return value % range;
            }
        }
    }
}

impl RngCore for Keystream {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_be_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_be_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest {
            *byte = self.next_byte();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

#[test]
fn first_block_matches_digest() {
    let seed = Seed::from_password("tests");
    let mut stream = Keystream::new(&seed);

    let mut expected = Sha256::new();
    expected.update(seed.as_bytes());
    expected.update(0u64.to_be_bytes());
    let expected: [u8; 32] = expected.finalize().into();

    let mut first = [0u8; 40];
    stream.fill_bytes(&mut first);
    assert_eq!(&first[..32], &expected);

    let mut second = Sha256::new();
    second.update(seed.as_bytes());
    second.update(1u64.to_be_bytes());
    assert_eq!(&first[32..], &second.finalize()[..8]);
}

#[test]
fn words_are_big_endian() {
    let seed = Seed::from_bytes([7; 32]);
    let mut bytes = Keystream::new(&seed);
    let mut words = Keystream::new(&seed);

    let mut buf = [0u8; 8];
    bytes.fill_bytes(&mut buf);
    assert_eq!(words.next_u64(), u64::from_be_bytes(buf));
}

#[test]
fn below_stays_in_range() {
    let mut stream = Keystream::new(&Seed::from_password("range"));
    for range in [1u64, 2, 3, 7, 1000, u64::MAX] {
        for _ in 0..64 {
            assert!(stream.below(range) < range);
        }
    }
    assert_eq!(stream.below(1), 0);
}
