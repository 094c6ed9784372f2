use atbridge_transport::{available_ports, PortInfo};
use serde::Serialize;

use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_list, OutputFormat};

#[derive(Serialize)]
struct PortOutput {
    name: String,
    kind: &'static str,
    vid: Option<String>,
    pid: Option<String>,
    manufacturer: Option<String>,
    product: Option<String>,
    serial_number: Option<String>,
}

impl From<PortInfo> for PortOutput {
    fn from(port: PortInfo) -> Self {
        Self {
            name: port.name,
            kind: port.kind,
            vid: port.vid.map(|v| format!("{v:04x}")),
            pid: port.pid.map(|p| format!("{p:04x}")),
            manufacturer: port.manufacturer,
            product: port.product,
            serial_number: port.serial_number,
        }
    }
}

pub fn run(format: OutputFormat) -> CliResult<i32> {
    let ports: Vec<PortOutput> = available_ports()
        .map_err(|err| transport_error("list ports", err))?
        .into_iter()
        .map(PortOutput::from)
        .collect();

    let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    let rows = ports
        .iter()
        .map(|p| {
            let id = match (&p.vid, &p.pid) {
                (Some(vid), Some(pid)) => format!("{vid}:{pid}"),
                _ => "-".to_string(),
            };
            vec![p.name.clone(), p.kind.to_string(), id, dash(&p.product)]
        })
        .collect();
    print_list(&ports, &["PORT", "TYPE", "VID:PID", "PRODUCT"], rows, format);
    Ok(SUCCESS)
}
