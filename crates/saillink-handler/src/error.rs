/// Errors that can occur in handler lifecycle operations.
///
/// Nothing in here escapes a worker loop: failures inside the loops are
/// absorbed locally (logged, dropped, or folded into liveness). These errors
/// only surface from `start()`.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] saillink_transport::TransportError),

    /// The handler's workers are already running.
    #[error("handler already started")]
    AlreadyStarted,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(std::io::Error),
}

pub type Result<T> = std::result::Result<T, HandlerError>;
