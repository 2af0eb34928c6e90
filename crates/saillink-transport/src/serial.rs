use std::io::{ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Default baud rate for the radio-modem link.
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Per-read timeout. A blocked `read_exact` wakes at this interval to check
/// whether the transport has been closed underneath it.
const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Serial-port transport to the sail agent (radio modem or serial cable).
///
/// The port is opened 8N1 with no flow control and its buffers flushed, then
/// split into independently-locked reader and writer halves so the transmit
/// and receive loops never contend on one lock.
pub struct SerialTransport {
    port_name: String,
    baud_rate: u32,
    reader: Mutex<Option<Box<dyn SerialPort>>>,
    writer: Mutex<Option<Box<dyn SerialPort>>>,
    open: AtomicBool,
}

impl SerialTransport {
    /// Create an unopened transport for the given port and baud rate.
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port_name: port_name.into(),
            baud_rate,
            reader: Mutex::new(None),
            writer: Mutex::new(None),
            open: AtomicBool::new(false),
        }
    }

    /// The configured port name.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl Transport for SerialTransport {
    fn open(&self) -> Result<()> {
        if self.open.load(Ordering::SeqCst) {
            return Ok(());
        }

        let port = serialport::new(self.port_name.as_str(), self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|err| TransportError::Open {
                port: self.port_name.clone(),
                source: err.into(),
            })?;

        // Discard whatever arrived while nobody was listening.
        let _ = port.clear(ClearBuffer::All);

        let reader = port.try_clone().map_err(|err| TransportError::Open {
            port: self.port_name.clone(),
            source: err.into(),
        })?;

        *self.reader.lock().unwrap() = Some(reader);
        *self.writer.lock().unwrap() = Some(port);
        self.open.store(true, Ordering::SeqCst);

        info!(port = %self.port_name, baud = self.baud_rate, "serial transport open");
        Ok(())
    }

    fn close(&self) {
        let was_open = self.open.swap(false, Ordering::SeqCst);
        // The flag is cleared before the halves are dropped: a blocked
        // read_exact observes it at its next timeout tick and releases the
        // reader lock, letting the take below proceed.
        self.writer.lock().unwrap().take();
        self.reader.lock().unwrap().take();
        if was_open {
            info!(port = %self.port_name, "serial transport closed");
        }
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::NotOpen);
        }
        let mut guard = self.writer.lock().unwrap();
        let port = guard.as_mut().ok_or(TransportError::NotOpen)?;
        // No flush: tcdrain can stall for the full hardware drain on some
        // platforms, and write_all has already handed the bytes to the kernel.
        port.write_all(bytes)?;
        Ok(())
    }

    fn read_exact(&self, buf: &mut [u8]) -> Result<()> {
        let mut guard = self.reader.lock().unwrap();
        let port = guard.as_mut().ok_or(TransportError::NotOpen)?;

        let mut filled = 0;
        while filled < buf.len() {
            if !self.open.load(Ordering::SeqCst) {
                return Err(TransportError::Closed);
            }
            match port.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(TransportError::Io(std::io::Error::new(
                        ErrorKind::UnexpectedEof,
                        "serial stream ended",
                    )))
                }
                Ok(n) => filled += n,
                Err(err)
                    if err.kind() == ErrorKind::TimedOut
                        || err.kind() == ErrorKind::WouldBlock
                        || err.kind() == ErrorKind::Interrupted =>
                {
                    continue
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unopened() {
        let transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        assert!(!transport.is_open());
        assert_eq!(transport.port_name(), "/dev/ttyUSB0");
    }

    #[test]
    fn open_reports_missing_device() {
        let transport = SerialTransport::new("/dev/saillink-does-not-exist", DEFAULT_BAUD_RATE);
        let err = transport.open().unwrap_err();
        assert!(matches!(err, TransportError::Open { .. }));
        assert!(!transport.is_open());
    }

    #[test]
    fn io_on_unopened_transport_fails() {
        let transport = SerialTransport::new("/dev/saillink-does-not-exist", DEFAULT_BAUD_RATE);
        assert!(matches!(
            transport.write(&[0, 0, 0]),
            Err(TransportError::NotOpen)
        ));
        let mut buf = [0u8; 14];
        assert!(matches!(
            transport.read_exact(&mut buf),
            Err(TransportError::NotOpen)
        ));
    }

    #[test]
    fn close_is_safe_on_unopened_transport() {
        let transport = SerialTransport::new("/dev/ttyUSB0", DEFAULT_BAUD_RATE);
        transport.close();
        transport.close();
        assert!(!transport.is_open());
    }
}
