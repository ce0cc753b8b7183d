//! fdn-engine: Multi-channel reverb engine
//!
//! Owns one feedback delay network per audio channel and applies parameter
//! edits from a control thread between blocks.
//!
//! ```text
//! control thread                     audio thread
//! ReverbHandle ──(rtrb queue)──▶ ReverbProcessor::process()
//!                                  ├─ drain ControlMessages
//!                                  ├─ gate (pending / running)
//!                                  └─ FDN per channel, in place
//! ```

mod command;
mod handle;
mod processor;

pub use command::{ControlMessage, ProcessingFlag, ProcessingState};
pub use handle::ReverbHandle;
pub use processor::{COMMAND_QUEUE_CAPACITY, ReverbProcessor};
