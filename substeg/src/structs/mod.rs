//! Data structures representing subtitle timing.
//!
//! Contains the SRT timestamp type, the ordered endpoint sequence parsed
//! from a track, its message capacity, and the password-derived seed.

pub mod seed;
pub mod timestamp;
pub mod timing;
