//! Utility functions shared by the index and the command line.
//!
//! - [`encoding`] - Little-endian integers and a bounds-checked byte cursor
//! - [`normalize`] - Key normalization for dictionary files
//! - [`progress`] - Optional progress bars (feature `progress`)

pub mod encoding;
pub mod normalize;
pub mod progress;

pub use encoding::*;
pub use normalize::*;
