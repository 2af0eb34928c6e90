use saillink_frame::Command;
use saillink_transport::{SerialTransport, Transport};

use crate::cmd::{CommandKind, SendArgs};
use crate::exit::{transport_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let command = resolve_command(args.command, args.course)?;

    let transport = SerialTransport::new(args.port, args.baud);
    transport
        .open()
        .map_err(|err| transport_error("open failed", err))?;
    transport
        .write(&command.encode())
        .map_err(|err| transport_error("send failed", err))?;
    transport.close();

    tracing::info!(?command, "command sent");
    Ok(SUCCESS)
}

fn resolve_command(kind: CommandKind, course: Option<u16>) -> CliResult<Command> {
    match (kind, course) {
        (CommandKind::Heartbeat, None) => Ok(Command::Heartbeat),
        (CommandKind::StartRoute, None) => Ok(Command::StartRoute),
        (CommandKind::StopRoute, None) => Ok(Command::StopRoute),
        (CommandKind::SetCourse, Some(course)) => Ok(Command::SetCourse(course)),
        (CommandKind::SetCourse, None) => Err(CliError::new(
            USAGE,
            "set-course requires a course in degrees",
        )),
        (_, Some(_)) => Err(CliError::new(
            USAGE,
            "only set-course takes a course argument",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_commands() {
        assert_eq!(
            resolve_command(CommandKind::Heartbeat, None).unwrap(),
            Command::Heartbeat
        );
        assert_eq!(
            resolve_command(CommandKind::StartRoute, None).unwrap(),
            Command::StartRoute
        );
        assert_eq!(
            resolve_command(CommandKind::StopRoute, None).unwrap(),
            Command::StopRoute
        );
    }

    #[test]
    fn set_course_requires_course() {
        assert_eq!(
            resolve_command(CommandKind::SetCourse, Some(90)).unwrap(),
            Command::SetCourse(90)
        );
        let err = resolve_command(CommandKind::SetCourse, None).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn course_is_rejected_for_other_commands() {
        let err = resolve_command(CommandKind::StartRoute, Some(90)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
