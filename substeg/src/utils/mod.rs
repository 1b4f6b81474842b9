//! Utility functions and supporting infrastructure.
//!
//! Provides the text/bit codec, the password-keyed keystream used for
//! position selection, and the error types shared by the pipeline.

pub mod bitcodec;
pub mod errors;
pub mod keystream;
