use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use saillink_handler::{AgentSimulator, SimulatorConfig};
use saillink_transport::SerialTransport;

use crate::cmd::SimulateArgs;
use crate::exit::{handler_error, CliError, CliResult, SUCCESS};

pub fn run(args: SimulateArgs) -> CliResult<i32> {
    let transport = Arc::new(SerialTransport::new(args.port, args.baud));
    let config = SimulatorConfig {
        telemetry_interval: Duration::from_millis(args.interval_ms),
        initial_wind_direction: args.wind_direction,
        battery_status: args.battery,
        autonomous: args.autonomous,
        ..SimulatorConfig::default()
    };

    let mut sim = AgentSimulator::new(transport, config);
    sim.start()
        .map_err(|err| handler_error("start failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(50));
    }

    sim.stop();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
