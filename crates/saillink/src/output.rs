use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use saillink_frame::TelemetryFrame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct TelemetryOutput {
    wind_direction: u16,
    wind_speed: u16,
    agent_speed: u16,
    agent_pos_x: i16,
    agent_pos_y: i16,
    battery_status: u8,
    agent_direction: u16,
    autonomous: bool,
    connected: bool,
    timestamp: String,
}

pub fn print_telemetry(frame: &TelemetryFrame, connected: bool, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = TelemetryOutput {
                wind_direction: frame.wind_direction,
                wind_speed: frame.wind_speed,
                agent_speed: frame.agent_speed,
                agent_pos_x: frame.agent_pos_x,
                agent_pos_y: frame.agent_pos_y,
                battery_status: frame.battery_status,
                agent_direction: frame.agent_direction,
                autonomous: frame.status_info.is_autonomous(),
                connected,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "WIND DIR", "WIND SPD", "SPEED", "POS X", "POS Y", "BATT", "HEADING", "MODE",
                    "LINK",
                ])
                .add_row(vec![
                    format!("{}°", frame.wind_direction),
                    format!("{} cm/s", frame.wind_speed),
                    format!("{} cm/s", frame.agent_speed),
                    frame.agent_pos_x.to_string(),
                    frame.agent_pos_y.to_string(),
                    format!("{}%", frame.battery_status),
                    format!("{}°", frame.agent_direction),
                    mode_name(frame).to_string(),
                    if connected { "up" } else { "down" }.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "wind={}°@{}cm/s speed={}cm/s pos=({},{}) batt={}% heading={}° mode={} link={}",
                frame.wind_direction,
                frame.wind_speed,
                frame.agent_speed,
                frame.agent_pos_x,
                frame.agent_pos_y,
                frame.battery_status,
                frame.agent_direction,
                mode_name(frame),
                if connected { "up" } else { "down" }
            );
        }
    }
}

fn mode_name(frame: &TelemetryFrame) -> &'static str {
    if frame.status_info.is_autonomous() {
        "autonomous"
    } else {
        "manual"
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
