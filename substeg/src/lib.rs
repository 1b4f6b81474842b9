//! Password-keyed steganography in SubRip subtitle timing.
//!
//! ## Technical Overview
//!
//! A message is carried by the parity of the millisecond field of subtitle
//! timestamps. Every timing line `HH:MM:SS,mmm --> HH:MM:SS,mmm` provides two
//! carrier bits, one per endpoint.
//!
//! ### Position Selection
//!
//! The SHA-256 digest of the password keys a counter-mode keystream, which
//! drives a partial Fisher–Yates shuffle of the endpoint indices. The same
//! password and track always select the same positions in the same order.
//!
//! ### Capacity
//!
//! A track with `N` endpoints carries `floor(N / 8)` Latin-1 characters.
//! Shorter messages are padded with random alphanumeric filler, so a track
//! always carries its full capacity and the message length is not revealed
//! by the number of edits.
//!
//! ### Embedding
//!
//! A mismatching bit is written by moving a START endpoint one millisecond
//! later or an END endpoint one millisecond earlier. Edits that would put a
//! timestamp out of order with its neighbours are refused and reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use substeg::process::{EXAMPLE_SRT, Stego};
//! use substeg::structs::seed::Seed;
//!
//! let stego = Stego::new(Seed::from_password("correct horse"));
//!
//! let hidden = stego.hide(EXAMPLE_SRT, "meet")?;
//! assert_eq!(stego.reveal(&hidden.srt)?, "meet");
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! The individual stages are available separately:
//!
//! 1. Parse timing lines with [`process::parse::parse`]
//! 2. Select positions with [`process::select::select`]
//! 3. Embed bits with [`process::embed::Embedder`]
//! 4. Read bits back with [`process::extract::extract_text`]
//! 5. Serialize the track with [`process::rewrite::rewrite`]

/// Processing stages and the [`Stego`](process::Stego) pipeline.
///
/// 1. **Parsing** ([`process::parse`]): SubRip text to timing endpoints.
///
/// 2. **Selection** ([`process::select`]): seed to ordered positions.
///
/// 3. **Embedding** ([`process::embed`]) and **Extraction**
///    ([`process::extract`]): writing and reading parity bits.
///
/// 4. **Rewriting** ([`process::rewrite`]): endpoints back to SubRip text.
pub mod process;

/// Data structures representing subtitle timing.
///
/// - **Timestamps** ([`structs::timestamp`]): `HH:MM:SS,mmm` instants
/// - **Timing** ([`structs::timing`]): Endpoint sequence and capacity
/// - **Seed** ([`structs::seed`]): Password digest
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Bit Codec** ([`utils::bitcodec`]): Text to bits and back, filler
/// - **Keystream** ([`utils::keystream`]): Seeded deterministic generator
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
