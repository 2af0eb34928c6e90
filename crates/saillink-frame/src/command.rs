use crate::error::{FrameError, Result};

/// Wire size of every command frame: tag byte + 2 payload bytes.
pub const COMMAND_SIZE: usize = 3;

/// An outbound instruction for the sail agent.
///
/// Wire format:
/// ```text
/// ┌──────────┬────────────────┐
/// │ Tag (1B) │ Payload (2B LE) │
/// │ 0..=3    │ zero-filled when unused │
/// └──────────┴────────────────┘
/// ```
///
/// Commands are fire-and-forget: there is no acknowledgement, and a dropped
/// frame is never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Keep-alive with no effect on the agent.
    Heartbeat,
    /// Begin sailing the planned route.
    StartRoute,
    /// Abort the current route.
    StopRoute,
    /// Steer to the given course (degrees).
    SetCourse(u16),
}

/// The tag of a command frame, as found in its first wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    Heartbeat = 0,
    StartRoute = 1,
    StopRoute = 2,
    SetCourse = 3,
}

impl CommandId {
    /// Map a tag byte to its command id.
    ///
    /// Any value outside `0..=3` is a recoverable decode error; the receiving
    /// side is expected to log and skip the frame, not abort.
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(CommandId::Heartbeat),
            1 => Ok(CommandId::StartRoute),
            2 => Ok(CommandId::StopRoute),
            3 => Ok(CommandId::SetCourse),
            other => Err(FrameError::UnknownCommand(other)),
        }
    }
}

impl Command {
    /// The tag this command carries on the wire.
    pub fn id(&self) -> CommandId {
        match self {
            Command::Heartbeat => CommandId::Heartbeat,
            Command::StartRoute => CommandId::StartRoute,
            Command::StopRoute => CommandId::StopRoute,
            Command::SetCourse(_) => CommandId::SetCourse,
        }
    }

    /// Encode into the 3-byte wire format. Pure and total.
    pub fn encode(&self) -> [u8; COMMAND_SIZE] {
        let payload = match *self {
            Command::SetCourse(course) => course,
            _ => 0,
        };
        let payload = payload.to_le_bytes();
        [self.id() as u8, payload[0], payload[1]]
    }

    /// Decode a 3-byte command frame (the agent side of the link).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != COMMAND_SIZE {
            return Err(FrameError::LengthMismatch {
                len: bytes.len(),
                expected: COMMAND_SIZE,
            });
        }

        let payload = u16::from_le_bytes([bytes[1], bytes[2]]);
        Ok(match CommandId::from_byte(bytes[0])? {
            CommandId::Heartbeat => Command::Heartbeat,
            CommandId::StartRoute => Command::StartRoute,
            CommandId::StopRoute => Command::StopRoute,
            CommandId::SetCourse => Command::SetCourse(payload),
        })
    }
}
