//! Fixed-length wire framing for the ground-station ↔ sail-agent link.
//!
//! The protocol has exactly two frame types, both of a-priori-known size:
//! - 3-byte command frames (ground station → agent)
//! - 14-byte telemetry frames (agent → ground station)
//!
//! There are no delimiters and no checksums; frame boundaries are implied by
//! the fixed lengths each side expects. Multi-byte fields are little-endian.

pub mod command;
pub mod error;
pub mod telemetry;

pub use command::{Command, CommandId, COMMAND_SIZE};
pub use error::{FrameError, Result};
pub use telemetry::{StatusInfo, TelemetryFrame, TELEMETRY_SIZE};
