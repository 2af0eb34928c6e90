use clap::{Args, Subcommand, ValueEnum};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod monitor;
pub mod ports;
pub mod send;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the ground-station console: print telemetry as it arrives.
    Monitor(MonitorArgs),
    /// Send a single command to the agent.
    Send(SendArgs),
    /// Run a simulated sail agent on a serial port.
    Simulate(SimulateArgs),
    /// List available serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Monitor(args) => monitor::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Simulate(args) => simulate::run(args),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Serial port of the radio modem (e.g. /dev/ttyUSB0).
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = saillink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Exit after printing N telemetry frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum CommandKind {
    Heartbeat,
    StartRoute,
    StopRoute,
    SetCourse,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port of the radio modem.
    pub port: String,
    /// Command to send.
    pub command: CommandKind,
    /// Course in degrees; required for set-course.
    pub course: Option<u16>,
    /// Baud rate.
    #[arg(long, default_value_t = saillink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Serial port the simulated agent answers on.
    pub port: String,
    /// Baud rate.
    #[arg(long, default_value_t = saillink_transport::DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Telemetry interval in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
    /// Initial wind direction in degrees.
    #[arg(long, default_value_t = 0)]
    pub wind_direction: u16,
    /// Reported battery charge in percent.
    #[arg(long, default_value_t = 100)]
    pub battery: u8,
    /// Report autonomous mode.
    #[arg(long)]
    pub autonomous: bool,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
