use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use saillink_handler::ConnectionHandler;
use saillink_transport::SerialTransport;

use crate::cmd::MonitorArgs;
use crate::exit::{handler_error, CliError, CliResult, SUCCESS};
use crate::output::{print_telemetry, OutputFormat};

const POLL: Duration = Duration::from_millis(20);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let transport = Arc::new(SerialTransport::new(args.port, args.baud));
    let mut handler = ConnectionHandler::new(transport);

    // The listener runs on the receive loop, so it only flags the change;
    // rendering happens over here on the console's own cadence.
    let updated = Arc::new(AtomicBool::new(false));
    handler.subscribe({
        let updated = Arc::clone(&updated);
        move || updated.store(true, Ordering::SeqCst)
    });

    handler
        .start()
        .map_err(|err| handler_error("start failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_connected = handler.is_connected();
    let mut last_frame = None;

    while running.load(Ordering::SeqCst) {
        if updated.swap(false, Ordering::SeqCst) {
            let connected = handler.is_connected();
            if connected != last_connected {
                tracing::info!(connected, "link state changed");
                last_connected = connected;
            }

            // Loss notifications carry no new frame; only a fresh frame is
            // worth a row.
            if let Some(frame) = handler.current_telemetry() {
                if last_frame != Some(frame) {
                    print_telemetry(&frame, connected, format);
                    last_frame = Some(frame);
                    printed = printed.saturating_add(1);

                    if let Some(count) = args.count {
                        if printed >= count {
                            break;
                        }
                    }
                }
            }
        }
        thread::sleep(POLL);
    }

    handler.stop();
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
