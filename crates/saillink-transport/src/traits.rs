use crate::error::Result;

/// A half-duplex point-to-point byte stream to the sail agent.
///
/// The connection handler drives one `Transport` from two worker threads at
/// once: the transmit loop calls [`write`](Transport::write) while the
/// receive loop sits in [`read_exact`](Transport::read_exact).
/// Implementations must therefore be safe for concurrent use and must uphold
/// two contracts the handler depends on:
///
/// - `read_exact` fills the buffer completely or returns an error. It never
///   silently short-reads; a partial arrival keeps blocking until the rest
///   of the bytes show up or the stream fails.
/// - `close` unblocks any in-flight `read_exact` promptly. Without this,
///   a handler `stop()` would hang on the receive loop's join.
pub trait Transport: Send + Sync {
    /// Establish the underlying byte stream. Opening an already-open
    /// transport is a no-op; failures are reported the same way every time.
    fn open(&self) -> Result<()>;

    /// Release the stream. Safe to call on an unopened or already-closed
    /// transport. Must unblock a blocked `read_exact`.
    fn close(&self);

    /// Blocking best-effort write of all of `bytes`.
    fn write(&self, bytes: &[u8]) -> Result<()>;

    /// Blocking read of exactly `buf.len()` bytes.
    fn read_exact(&self, buf: &mut [u8]) -> Result<()>;

    /// Whether the stream is currently established.
    fn is_open(&self) -> bool;
}
