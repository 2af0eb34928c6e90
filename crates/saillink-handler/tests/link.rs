//! End-to-end link tests: a ConnectionHandler on one end of an in-memory
//! pair, raw bytes or an AgentSimulator on the other.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use saillink_frame::{Command, TelemetryFrame, COMMAND_SIZE, TELEMETRY_SIZE};
use saillink_handler::{AgentSimulator, ConnectionHandler, SimulatorConfig};
use saillink_transport::{PairTransport, Transport};

const TELEMETRY_BYTES: [u8; TELEMETRY_SIZE] = [
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E,
];

fn wait_until(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let end = Instant::now() + deadline;
    while Instant::now() < end {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    condition()
}

#[test]
fn telemetry_bytes_reach_the_subscriber() {
    let (agent_end, ground_end) = PairTransport::pair();
    agent_end.open().unwrap();

    let mut ground = ConnectionHandler::new(Arc::new(ground_end));
    let changes = Arc::new(AtomicUsize::new(0));
    ground.subscribe({
        let changes = Arc::clone(&changes);
        move || {
            changes.fetch_add(1, Ordering::SeqCst);
        }
    });
    ground.start().unwrap();

    agent_end.write(&TELEMETRY_BYTES).unwrap();

    assert!(wait_until(Duration::from_secs(2), || changes
        .load(Ordering::SeqCst)
        > 0));
    let frame = ground.current_telemetry().expect("frame should be stored");
    assert_eq!(frame.encode(), TELEMETRY_BYTES);
    assert_eq!(frame, TelemetryFrame::decode(&TELEMETRY_BYTES).unwrap());

    ground.stop();
    assert!(!ground.is_connected());
}

#[test]
fn handler_against_simulator() {
    let (agent_end, ground_end) = PairTransport::pair();

    let mut agent = AgentSimulator::new(
        Arc::new(agent_end),
        SimulatorConfig {
            telemetry_interval: Duration::from_millis(25),
            autonomous: true,
            ..SimulatorConfig::default()
        },
    );
    agent.start().unwrap();

    let mut ground = ConnectionHandler::new(Arc::new(ground_end));
    ground.start().unwrap();

    assert!(wait_until(Duration::from_secs(2), || ground
        .current_telemetry()
        .is_some()));
    assert!(ground.is_connected());
    let frame = ground.current_telemetry().unwrap();
    assert_eq!(frame.agent_speed, 270);
    assert!(frame.status_info.is_autonomous());

    ground.send_command(Command::SetCourse(90));
    ground.send_command(Command::StartRoute);

    // Heartbeats may interleave with the queued commands; the commands
    // themselves must arrive in FIFO order.
    let queued = |cmds: &[Command]| -> Vec<Command> {
        cmds.iter()
            .copied()
            .filter(|cmd| *cmd != Command::Heartbeat)
            .collect()
    };
    assert!(wait_until(Duration::from_secs(2), || queued(
        &agent.received_commands()
    )
    .len()
        >= 2));
    assert_eq!(
        queued(&agent.received_commands()),
        vec![Command::SetCourse(90), Command::StartRoute]
    );

    // The agent going silent by closing its end is a liveness loss for the
    // ground station.
    agent.stop();
    assert!(wait_until(Duration::from_secs(2), || !ground.is_connected()));

    ground.stop();
}

#[test]
fn ground_station_heartbeats_reach_an_idle_agent() {
    let (agent_end, ground_end) = PairTransport::pair();
    agent_end.open().unwrap();

    let mut ground = ConnectionHandler::new(Arc::new(ground_end));
    ground.start().unwrap();

    // The agent sends nothing; the ground station's receive loop just
    // blocks, and the transmit loop must still heartbeat.
    let mut buf = [0u8; COMMAND_SIZE];
    agent_end.read_exact(&mut buf).unwrap();
    assert_eq!(Command::decode(&buf).unwrap(), Command::Heartbeat);

    ground.stop();
}
