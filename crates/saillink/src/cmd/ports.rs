use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serialport::SerialPortType;

use crate::cmd::PortsArgs;
use crate::exit::{CliError, CliResult, SUCCESS, TRANSPORT_ERROR};
use crate::output::OutputFormat;

pub fn run(_args: PortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = serialport::available_ports()
        .map_err(|err| CliError::new(TRANSPORT_ERROR, format!("port enumeration failed: {err}")))?;

    match format {
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = ports
                .iter()
                .map(|port| {
                    serde_json::json!({
                        "name": port.port_name,
                        "kind": kind_name(&port.port_type),
                        "product": product_name(&port.port_type),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string(&entries).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "KIND", "PRODUCT"]);
            for port in &ports {
                table.add_row(vec![
                    port.port_name.clone(),
                    kind_name(&port.port_type).to_string(),
                    product_name(&port.port_type).unwrap_or_else(|| "-".to_string()),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for port in &ports {
                println!("{} ({})", port.port_name, kind_name(&port.port_type));
            }
        }
    }

    Ok(SUCCESS)
}

fn kind_name(port_type: &SerialPortType) -> &'static str {
    match port_type {
        SerialPortType::UsbPort(_) => "usb",
        SerialPortType::BluetoothPort => "bluetooth",
        SerialPortType::PciPort => "pci",
        SerialPortType::Unknown => "unknown",
    }
}

fn product_name(port_type: &SerialPortType) -> Option<String> {
    match port_type {
        SerialPortType::UsbPort(info) => info.product.clone(),
        _ => None,
    }
}
