mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "saillink", version, about = "Ground-station console for the sail-agent link")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_monitor_subcommand() {
        let cli = Cli::try_parse_from(["saillink", "monitor", "/dev/ttyUSB0", "--count", "5"])
            .expect("monitor args should parse");
        assert!(matches!(cli.command, Command::Monitor(_)));
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["saillink", "send", "/dev/ttyUSB0", "set-course", "90"])
            .expect("send args should parse");
        let Command::Send(args) = cli.command else {
            panic!("expected send command");
        };
        assert_eq!(args.course, Some(90));
    }

    #[test]
    fn parses_simulate_with_interval() {
        let cli = Cli::try_parse_from([
            "saillink",
            "simulate",
            "/dev/ttyUSB1",
            "--interval-ms",
            "125",
            "--autonomous",
        ])
        .expect("simulate args should parse");
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate command");
        };
        assert_eq!(args.interval_ms, 125);
        assert!(args.autonomous);
    }

    #[test]
    fn rejects_unknown_command_kind() {
        let err = Cli::try_parse_from(["saillink", "send", "/dev/ttyUSB0", "self-destruct"])
            .expect_err("unknown command kind should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
