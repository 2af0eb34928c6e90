//! Connection handling for the ground-station ↔ sail-agent link.
//!
//! This is the "just works" layer. Hand a [`ConnectionHandler`] a transport
//! and it runs the link: queued commands go out, telemetry frames come in,
//! heartbeats keep the peer seeing traffic, and link liveness is tracked
//! from inbound frame validity.
//!
//! [`AgentSimulator`] is the other side of the wire — a stand-in sail agent
//! for demos and end-to-end tests.

pub mod error;
pub mod handler;
pub mod listener;
pub mod queue;
pub mod sim;

pub use error::{HandlerError, Result};
pub use handler::{ConnectionHandler, HEARTBEAT_INTERVAL};
pub use listener::Listener;
pub use queue::CommandQueue;
pub use sim::{AgentSimulator, SimulatorConfig};
