use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use saillink_frame::{Command, StatusInfo, TelemetryFrame, COMMAND_SIZE};
use saillink_transport::Transport;
use tracing::{debug, info, trace, warn};

use crate::error::{HandlerError, Result};

/// How far the simulated wind direction may wander from its initial value.
const DIRECTION_MAX_SWING: i32 = 20;
/// Largest per-tick change in wind direction, degrees.
const DIRECTION_STEP: i32 = 3;
/// Largest per-tick change in wind speed, cm/s.
const SPEED_STEP: i32 = 100;
/// Wind speed ceiling, cm/s.
const SPEED_MAX: i32 = 3000;
const DEGREES: i32 = 360;

/// Granularity of the interruptible sleeps between telemetry ticks.
const SLEEP_SLICE: Duration = Duration::from_millis(10);
/// Back-off after a failed command read.
const READ_RETRY: Duration = Duration::from_millis(10);

/// Bounded random walk for the simulated wind.
struct WindModel {
    initial_direction: i32,
    swing: i32,
    speed: i32,
}

impl WindModel {
    fn new(initial_direction: u16) -> Self {
        Self {
            initial_direction: i32::from(initial_direction),
            swing: 0,
            speed: 0,
        }
    }

    fn step(&mut self, rng: &mut impl Rng) {
        self.swing = (self.swing + rng.gen_range(-DIRECTION_STEP..=DIRECTION_STEP))
            .clamp(-DIRECTION_MAX_SWING, DIRECTION_MAX_SWING);
        self.speed = (self.speed + rng.gen_range(-SPEED_STEP..=SPEED_STEP)).clamp(0, SPEED_MAX);
    }

    fn direction(&self) -> u16 {
        (self.initial_direction + self.swing).rem_euclid(DEGREES) as u16
    }

    fn speed(&self) -> u16 {
        self.speed as u16
    }
}

/// Configuration for the simulated sail agent.
#[derive(Debug, Clone, Copy)]
pub struct SimulatorConfig {
    /// Interval between telemetry frames.
    pub telemetry_interval: Duration,
    /// Wind direction the random walk is centered on, degrees.
    pub initial_wind_direction: u16,
    /// Reported agent speed, cm/s.
    pub agent_speed: u16,
    /// Reported agent heading, degrees.
    pub agent_direction: u16,
    /// Reported agent position, x axis.
    pub agent_pos_x: i16,
    /// Reported agent position, y axis.
    pub agent_pos_y: i16,
    /// Reported battery charge, percent.
    pub battery_status: u8,
    /// Whether the agent reports autonomous mode.
    pub autonomous: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            telemetry_interval: Duration::from_millis(1000),
            initial_wind_direction: 0,
            agent_speed: 270,
            agent_direction: 10,
            agent_pos_x: 0,
            agent_pos_y: 0,
            battery_status: 100,
            autonomous: false,
        }
    }
}

/// A stand-in sail agent: the peer side of the wire for demos and
/// end-to-end tests.
///
/// Runs two workers over its own transport end, mirroring the handler's
/// model: one streams telemetry with a wandering wind, the other decodes and
/// logs incoming 3-byte commands. Unknown command tags are logged and
/// ignored, never fatal.
pub struct AgentSimulator {
    transport: Arc<dyn Transport>,
    config: SimulatorConfig,
    running: Arc<AtomicBool>,
    received: Arc<Mutex<Vec<Command>>>,
    workers: Vec<JoinHandle<()>>,
}

impl AgentSimulator {
    pub fn new(transport: Arc<dyn Transport>, config: SimulatorConfig) -> Self {
        Self {
            transport,
            config,
            running: Arc::new(AtomicBool::new(false)),
            received: Arc::new(Mutex::new(Vec::new())),
            workers: Vec::new(),
        }
    }

    /// Open the transport and start streaming telemetry / consuming
    /// commands.
    pub fn start(&mut self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(HandlerError::AlreadyStarted);
        }

        self.transport.open()?;
        self.running.store(true, Ordering::SeqCst);

        let spawn_results = [
            {
                let transport = Arc::clone(&self.transport);
                let running = Arc::clone(&self.running);
                let config = self.config;
                thread::Builder::new()
                    .name("saillink-sim-telemetry".into())
                    .spawn(move || telemetry_worker(&*transport, &config, &running))
            },
            {
                let transport = Arc::clone(&self.transport);
                let running = Arc::clone(&self.running);
                let received = Arc::clone(&self.received);
                thread::Builder::new()
                    .name("saillink-sim-commands".into())
                    .spawn(move || command_worker(&*transport, &running, &received))
            },
        ];

        let mut spawn_err = None;
        for result in spawn_results {
            match result {
                Ok(handle) => self.workers.push(handle),
                Err(err) => spawn_err = Some(err),
            }
        }
        if let Some(err) = spawn_err {
            self.stop();
            return Err(HandlerError::Spawn(err));
        }

        info!("agent simulator started");
        Ok(())
    }

    /// Stop both workers and close the transport.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.transport.close();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }

    /// Commands decoded so far, in arrival order.
    pub fn received_commands(&self) -> Vec<Command> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for AgentSimulator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn telemetry_worker(transport: &dyn Transport, config: &SimulatorConfig, running: &AtomicBool) {
    let mut rng = rand::thread_rng();
    let mut wind = WindModel::new(config.initial_wind_direction);
    let status = if config.autonomous { 0b0000_0001 } else { 0 };

    while running.load(Ordering::SeqCst) {
        wind.step(&mut rng);
        let frame = TelemetryFrame {
            wind_direction: wind.direction(),
            wind_speed: wind.speed(),
            agent_speed: config.agent_speed,
            agent_pos_x: config.agent_pos_x,
            agent_pos_y: config.agent_pos_y,
            battery_status: config.battery_status,
            agent_direction: config.agent_direction,
            status_info: StatusInfo::new(status),
        };

        match transport.write(&frame.encode()) {
            Ok(()) => trace!(?frame, "telemetry transmitted"),
            Err(err) => warn!(%err, "telemetry write failed"),
        }

        sleep_while_running(running, config.telemetry_interval);
    }

    debug!("simulator telemetry worker exited");
}

fn command_worker(transport: &dyn Transport, running: &AtomicBool, received: &Mutex<Vec<Command>>) {
    let mut buf = [0u8; COMMAND_SIZE];

    while running.load(Ordering::SeqCst) {
        if transport.read_exact(&mut buf).is_err() {
            thread::sleep(READ_RETRY);
            continue;
        }

        match Command::decode(&buf) {
            Ok(cmd) => {
                match cmd {
                    Command::Heartbeat => trace!("agent received heartbeat"),
                    Command::StartRoute => info!("agent received start route"),
                    Command::StopRoute => info!("agent received stop route"),
                    Command::SetCourse(course) => info!(course, "agent received course"),
                }
                received.lock().unwrap().push(cmd);
            }
            Err(err) => warn!(%err, "agent received unknown command, ignored"),
        }
    }

    debug!("simulator command worker exited");
}

/// Sleep for `total`, waking early if `running` clears.
fn sleep_while_running(running: &AtomicBool, total: Duration) {
    let deadline = Instant::now() + total;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(SLEEP_SLICE));
    }
}
