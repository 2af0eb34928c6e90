use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

/// Polling interval for a blocked read. Bounds how long a reader can keep
/// running after its own end was closed.
const RECV_POLL: Duration = Duration::from_millis(10);

/// One end of an in-memory connected transport pair.
///
/// Stands in for a looped-back radio link in tests and demos: bytes written
/// on one end come out of `read_exact` on the other. Closing either end
/// unblocks the peer's in-flight read, the same contract a real device close
/// provides. Like a radio, writes into a link whose peer has stopped
/// listening succeed and the bytes are simply lost.
pub struct PairTransport {
    tx: Mutex<Option<Sender<Vec<u8>>>>,
    rx: Mutex<PairReceiver>,
    open: AtomicBool,
}

struct PairReceiver {
    chunks: Receiver<Vec<u8>>,
    pending: VecDeque<u8>,
}

impl PairTransport {
    /// Create two connected ends. Each end still needs `open()` before use.
    pub fn pair() -> (PairTransport, PairTransport) {
        let (a_tx, b_rx) = mpsc::channel();
        let (b_tx, a_rx) = mpsc::channel();
        (Self::from_parts(a_tx, a_rx), Self::from_parts(b_tx, b_rx))
    }

    fn from_parts(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(PairReceiver {
                chunks: rx,
                pending: VecDeque::new(),
            }),
            open: AtomicBool::new(false),
        }
    }
}

impl Transport for PairTransport {
    fn open(&self) -> Result<()> {
        // A closed end cannot be re-established; the pair is single-use,
        // matching the no-restart lifecycle of the handler above it.
        if self.tx.lock().unwrap().is_none() {
            return Err(TransportError::Closed);
        }
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        if self.open.swap(false, Ordering::SeqCst) {
            debug!("pair transport closed");
        }
        // Dropping the sender disconnects the peer's receiver, failing its
        // blocked read; our own blocked read exits via the open flag.
        self.tx.lock().unwrap().take();
    }

    fn write(&self, bytes: &[u8]) -> Result<()> {
        if !self.open.load(Ordering::SeqCst) {
            return Err(TransportError::NotOpen);
        }
        let guard = self.tx.lock().unwrap();
        let sender = guard.as_ref().ok_or(TransportError::NotOpen)?;
        sender
            .send(bytes.to_vec())
            .map_err(|_| TransportError::Closed)
    }

    fn read_exact(&self, buf: &mut [u8]) -> Result<()> {
        let mut inner = self.rx.lock().unwrap();
        let mut filled = 0;
        while filled < buf.len() {
            if !self.open.load(Ordering::SeqCst) {
                return Err(TransportError::NotOpen);
            }
            if let Some(byte) = inner.pending.pop_front() {
                buf[filled] = byte;
                filled += 1;
                continue;
            }
            match inner.chunks.recv_timeout(RECV_POLL) {
                Ok(chunk) => inner.pending.extend(chunk),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return Err(TransportError::Closed),
            }
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

impl Drop for PairTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    use super::*;

    #[test]
    fn roundtrip_both_directions() {
        let (left, right) = PairTransport::pair();
        left.open().unwrap();
        right.open().unwrap();

        left.write(b"ground->agent").unwrap();
        let mut buf = [0u8; 13];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"ground->agent");

        right.write(b"agent->ground").unwrap();
        left.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"agent->ground");
    }

    #[test]
    fn read_assembles_across_writes() {
        let (left, right) = PairTransport::pair();
        left.open().unwrap();
        right.open().unwrap();

        left.write(b"abc").unwrap();
        left.write(b"defgh").unwrap();

        let mut buf = [0u8; 8];
        right.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"abcdefgh");
    }

    #[test]
    fn io_before_open_fails() {
        let (left, _right) = PairTransport::pair();
        assert!(matches!(left.write(b"x"), Err(TransportError::NotOpen)));
        let mut buf = [0u8; 1];
        assert!(matches!(
            left.read_exact(&mut buf),
            Err(TransportError::NotOpen)
        ));
    }

    #[test]
    fn local_close_unblocks_blocked_read() {
        let (left, _right) = PairTransport::pair();
        left.open().unwrap();
        let left = Arc::new(left);

        let reader = {
            let left = Arc::clone(&left);
            thread::spawn(move || {
                let mut buf = [0u8; 14];
                left.read_exact(&mut buf)
            })
        };

        thread::sleep(Duration::from_millis(50));
        let started = Instant::now();
        left.close();
        let result = reader.join().expect("reader thread should finish");

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn peer_close_fails_blocked_read() {
        let (left, right) = PairTransport::pair();
        left.open().unwrap();
        right.open().unwrap();

        let reader = thread::spawn(move || {
            let mut buf = [0u8; 14];
            right.read_exact(&mut buf)
        });

        thread::sleep(Duration::from_millis(50));
        drop(left);
        let result = reader.join().expect("reader thread should finish");
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[test]
    fn closed_end_cannot_reopen() {
        let (left, _right) = PairTransport::pair();
        left.open().unwrap();
        left.close();
        assert!(!left.is_open());
        assert!(matches!(left.open(), Err(TransportError::Closed)));
    }
}
