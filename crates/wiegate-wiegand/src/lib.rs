//! Wiegand frame decoding.
//!
//! Turns the stream of timestamped bit events produced by the GPIO edge
//! handlers into canonical card UIDs:
//!
//! - [`FrameAssembler`]: the idle-timeout framing state machine
//! - [`WiegandReader`]: the worker task driving the assembler from a pulse
//!   channel and forwarding UIDs to the access worker
//!
//! No parity or format validation is performed; any frame of 1 to 64 bits is
//! packed and emitted.

pub mod assembler;
pub mod config;
pub mod reader;

pub use assembler::{AssemblerState, FrameAssembler};
pub use config::ReaderConfig;
pub use reader::{ReaderStats, WiegandReader};
