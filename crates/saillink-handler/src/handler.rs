use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use saillink_frame::{Command, TelemetryFrame, TELEMETRY_SIZE};
use saillink_transport::Transport;
use tracing::{debug, info, trace, warn};

use crate::error::{HandlerError, Result};
use crate::listener::Listener;
use crate::queue::CommandQueue;

/// The peer must observe traffic at least this often; with nothing queued,
/// the transmit loop emits an implicit heartbeat at this interval.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_millis(1000);

/// Idle yield for the busy-poll loops.
const IDLE_POLL: Duration = Duration::from_millis(1);

type ListenerRegistry = Mutex<Vec<Box<dyn Listener>>>;

/// Runs the ground-station side of the link over one [`Transport`].
///
/// Two worker threads own the wire: the transmit loop drains queued commands
/// and keeps the heartbeat cadence, the receive loop blocks on fixed-size
/// telemetry reads and derives link liveness from their outcome. Both are
/// cancelled cooperatively by `stop()`; a handler cannot be restarted — build
/// a fresh one to reconnect.
///
/// Failure policy: nothing that happens on the wire terminates a worker. A
/// failed write drops that command (at-most-once delivery), a failed read or
/// decode flips liveness to lost and keeps polling. `is_connected` is the
/// only externally visible signal of degraded link health.
pub struct ConnectionHandler {
    transport: Arc<dyn Transport>,
    queue: Arc<CommandQueue>,
    running: Arc<AtomicBool>,
    live: Arc<AtomicBool>,
    telemetry: Arc<Mutex<Option<TelemetryFrame>>>,
    listeners: Arc<ListenerRegistry>,
    workers: Vec<JoinHandle<()>>,
}

impl ConnectionHandler {
    /// Create a handler over the given transport. Nothing runs until
    /// [`start`](ConnectionHandler::start).
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            queue: Arc::new(CommandQueue::new()),
            running: Arc::new(AtomicBool::new(false)),
            live: Arc::new(AtomicBool::new(false)),
            telemetry: Arc::new(Mutex::new(None)),
            listeners: Arc::new(Mutex::new(Vec::new())),
            workers: Vec::new(),
        }
    }

    /// Register a change listener. See [`Listener`] for the blocking
    /// contract.
    pub fn subscribe(&self, listener: impl Listener + 'static) {
        self.listeners.lock().unwrap().push(Box::new(listener));
    }

    /// Open the transport and spawn both worker loops.
    ///
    /// If the transport cannot be opened, nothing is spawned and no partial
    /// handler is left running. Liveness starts optimistic: the link is
    /// reported connected until the first inbound frame proves otherwise.
    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(HandlerError::AlreadyStarted);
        }

        self.transport.open()?;
        self.running.store(true, Ordering::SeqCst);
        self.live.store(true, Ordering::SeqCst);

        let transmit = {
            let transport = Arc::clone(&self.transport);
            let queue = Arc::clone(&self.queue);
            let running = Arc::clone(&self.running);
            let live = Arc::clone(&self.live);
            thread::Builder::new()
                .name("saillink-tx".into())
                .spawn(move || transmit_worker(&*transport, &queue, &running, &live))
        };
        let receive = {
            let transport = Arc::clone(&self.transport);
            let running = Arc::clone(&self.running);
            let live = Arc::clone(&self.live);
            let telemetry = Arc::clone(&self.telemetry);
            let listeners = Arc::clone(&self.listeners);
            thread::Builder::new().name("saillink-rx".into()).spawn(
                move || receive_worker(&*transport, &running, &live, &telemetry, &listeners),
            )
        };

        match (transmit, receive) {
            (Ok(tx), Ok(rx)) => {
                self.workers.push(tx);
                self.workers.push(rx);
                info!("connection handler started");
                Ok(())
            }
            (tx, rx) => {
                // One of the spawns failed; unwind whatever did start.
                self.running.store(false, Ordering::SeqCst);
                self.transport.close();
                let mut spawn_err = std::io::Error::other("worker spawn failed");
                for worker in [tx, rx] {
                    match worker {
                        Ok(handle) => {
                            let _ = handle.join();
                        }
                        Err(err) => spawn_err = err,
                    }
                }
                warn!("failed to start worker threads");
                Err(HandlerError::Spawn(spawn_err))
            }
        }
    }

    /// Signal both workers to stop, close the transport, and wait for the
    /// workers to exit. Commands still queued are dropped, not drained.
    ///
    /// Closing before joining is what unblocks the receive loop's in-flight
    /// read; the transport contract guarantees that close wakes it.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.transport.close();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// Enqueue a command for transmission. Non-blocking; delivery is
    /// best-effort and unacknowledged.
    pub fn send_command(&self, cmd: Command) {
        self.queue.push(cmd);
    }

    /// The most recent telemetry frame, or `None` before the first
    /// successful frame.
    pub fn current_telemetry(&self) -> Option<TelemetryFrame> {
        *self.telemetry.lock().unwrap()
    }

    /// Whether the link is currently believed healthy: transport open,
    /// workers running, and the last inbound frame decoded successfully.
    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
            && self.running.load(Ordering::SeqCst)
            && self.live.load(Ordering::SeqCst)
    }
}

impl Drop for ConnectionHandler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Drain queued commands while the link is live, keep the heartbeat cadence,
/// yield briefly between rounds.
fn transmit_worker(
    transport: &dyn Transport,
    queue: &CommandQueue,
    running: &AtomicBool,
    live: &AtomicBool,
) {
    let mut last_tx = Instant::now();

    while running.load(Ordering::SeqCst) {
        // Commands are only drained while the link is live; while lost they
        // stay queued and the heartbeat below keeps probing the wire.
        while live.load(Ordering::SeqCst) {
            let Some(cmd) = queue.pop() else { break };
            match transport.write(&cmd.encode()) {
                Ok(()) => debug!(?cmd, "command transmitted"),
                Err(err) => warn!(%err, ?cmd, "command write failed, dropped"),
            }
            // The attempt counts whether or not it succeeded.
            last_tx = Instant::now();
        }

        if last_tx.elapsed() > HEARTBEAT_INTERVAL {
            // Sent even while the link is lost, so the peer sees traffic the
            // moment it comes back.
            match transport.write(&Command::Heartbeat.encode()) {
                Ok(()) => trace!("heartbeat transmitted"),
                Err(err) => warn!(%err, "heartbeat write failed"),
            }
            last_tx = Instant::now();
        }

        thread::sleep(IDLE_POLL);
    }

    debug!("transmit worker exited");
}

/// Block on fixed-size telemetry reads; fold each outcome into liveness and
/// the latest-frame snapshot, notifying listeners either way.
fn receive_worker(
    transport: &dyn Transport,
    running: &AtomicBool,
    live: &AtomicBool,
    telemetry: &Mutex<Option<TelemetryFrame>>,
    listeners: &ListenerRegistry,
) {
    let mut buf = [0u8; TELEMETRY_SIZE];

    while running.load(Ordering::SeqCst) {
        let frame = match transport.read_exact(&mut buf) {
            Ok(()) => TelemetryFrame::decode(&buf).ok(),
            Err(_) => None,
        };

        let Some(frame) = frame else {
            // Lost link is a polling state, not a terminal one: keep reading
            // until frames become valid again.
            if live.swap(false, Ordering::SeqCst) {
                warn!("sail agent disconnected, polling for recovery");
            }
            notify(listeners);
            thread::sleep(IDLE_POLL);
            continue;
        };

        trace!(?frame, "telemetry received");
        if !live.swap(true, Ordering::SeqCst) {
            info!("sail agent connected");
        }
        *telemetry.lock().unwrap() = Some(frame);
        notify(listeners);
    }

    debug!("receive worker exited");
}

fn notify(listeners: &ListenerRegistry) {
    for listener in listeners.lock().unwrap().iter() {
        listener.on_change();
    }
}
