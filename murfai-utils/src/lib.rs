//! Audio helpers used when handling audio downloaded from the provider.

pub mod audio;

pub use audio::*;
