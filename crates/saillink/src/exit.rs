use std::fmt;

use saillink_handler::HandlerError;
use saillink_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    let code = match err {
        TransportError::Open { .. } | TransportError::NotOpen | TransportError::Closed => {
            TRANSPORT_ERROR
        }
        TransportError::Io(_) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn handler_error(context: &str, err: HandlerError) -> CliError {
    match err {
        HandlerError::Transport(err) => transport_error(context, err),
        HandlerError::AlreadyStarted => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
