//! Control messages from the UI/control thread to the audio thread

use fdn_core::{FdnDimension, Sample};

/// Parameter edit, applied at the start of the next audio block
#[derive(Debug, Clone, PartialEq)]
pub enum ControlMessage {
    /// Select the mixing matrix; delays must follow with `SetDelayPowers`
    SetDimension(FdnDimension),
    /// Regenerate delay lines (clears history and resets gain vectors)
    SetDelayPowers(Vec<u32>),
    SetGainVectors { b: Vec<Sample>, c: Vec<Sample> },
    SetDryWet(f32),
    SetProcessingFlag(ProcessingFlag),
}

/// Control-side permission to process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingFlag {
    Forbidden,
    #[default]
    Allowed,
}

/// Whether the last block was reverberated or passed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingState {
    /// Waiting for consistent parameters or for processing to be allowed
    #[default]
    Pending,
    Running,
}
