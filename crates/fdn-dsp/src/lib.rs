//! fdn-dsp: Feedback delay network reverberator
//!
//! ## Modules
//! - `matrix` - Generic row-major 2D container
//! - `hadamard` - Sylvester-Hadamard mixing matrices and the shared table
//! - `delay_bank` - Circular buffers, one row per delay line
//! - `network` - The feedback delay network and its per-sample recurrence
//! - `denormal` - Flush-to-zero guard for the audio thread

pub mod delay_bank;
pub mod denormal;
pub mod hadamard;
pub mod matrix;
pub mod network;

pub use delay_bank::DelayLineBank;
pub use hadamard::{HadamardMatrix, MATRIX_DAMPING, mix_matrix};
pub use matrix::Matrix;
pub use network::{FeedbackDelayNetwork, PRIMES};

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);

    /// Get latency in samples
    fn latency(&self) -> usize {
        0
    }
}
