/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the underlying device.
    #[error("failed to open {port}: {source}")]
    Open {
        port: String,
        source: std::io::Error,
    },

    /// Operation attempted before `open()` succeeded or after `close()`.
    #[error("transport not open")]
    NotOpen,

    /// The stream was closed while an operation was in flight.
    #[error("transport closed")]
    Closed,

    /// An I/O error occurred on the transport stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
