//! fdn-core: Shared types for the FDN reverberator
//!
//! This crate provides the foundational types used across all fdn crates:
//! the sample type, the network dimension, the error type and the
//! reverb settings the engine and the renderer are built from.

mod dimension;
mod error;
mod sample;
mod settings;

pub use dimension::*;
pub use error::*;
pub use sample::*;
pub use settings::*;

/// Longest delay any line may have, in samples
pub const MAX_DELAY: usize = 50_000;

/// Default dry/wet ratio of a freshly created reverb
pub const DEFAULT_DRY_WET: f32 = 0.5;
