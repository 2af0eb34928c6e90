//! Byte-stream transport abstraction for the ground-station ↔ sail-agent link.
//!
//! Provides the [`Transport`] capability the connection handler consumes,
//! plus two implementations:
//! - [`SerialTransport`] — a radio modem or serial cable via a serial port
//! - [`PairTransport`] — an in-memory connected pair for tests and demos
//!
//! This is the lowest layer of saillink. Everything else builds on top of
//! the [`Transport`] trait provided here.

pub mod error;
pub mod pair;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use pair::PairTransport;
pub use serial::{SerialTransport, DEFAULT_BAUD_RATE};
pub use traits::Transport;
