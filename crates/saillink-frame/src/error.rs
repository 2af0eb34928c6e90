/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// The input is not exactly the wire length of the frame type.
    #[error("frame length mismatch ({len} bytes, expected {expected})")]
    LengthMismatch { len: usize, expected: usize },

    /// The command tag byte does not name a known command.
    #[error("unknown command id {0:#04x}")]
    UnknownCommand(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;
