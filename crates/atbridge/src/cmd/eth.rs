use atbridge_client::{IpConfig, MacAddress, OperationError};
use atbridge_frame::Status;
use serde::Serialize;

use crate::cmd::{EthArgs, LinkArgs};
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{print_record, yes_no, OutputFormat};

#[derive(Serialize)]
struct EthOutput {
    initialized: bool,
    link_up: Option<bool>,
    mac: Option<MacAddress>,
    ip_config: Option<IpConfig>,
}

pub fn run(args: EthArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let mut eth = client.ethernet();

    if args.init {
        // clap guarantees the static fields travel together.
        let config = match (args.ip, args.gateway, args.subnet, args.dns) {
            (Some(ip), Some(gateway), Some(subnet), Some(dns)) => Some(IpConfig {
                ip,
                gateway,
                subnet,
                dns,
            }),
            _ => None,
        };
        eth.init(config).map_err(|err| op_error("ethernet init", err))?;
    }

    let initialized = eth
        .status()
        .map_err(|err| op_error("ethernet status", err))?;

    let mut out = EthOutput {
        initialized,
        link_up: None,
        mac: None,
        ip_config: None,
    };
    if initialized {
        out.link_up = not_initialized_as_none(eth.link_status())
            .map_err(|err| op_error("ethernet link", err))?;
        out.mac = not_initialized_as_none(eth.mac()).map_err(|err| op_error("ethernet mac", err))?;
        out.ip_config = not_initialized_as_none(eth.ip_config())
            .map_err(|err| op_error("ethernet ip", err))?;
    }

    let show = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    let mut fields = vec![
        ("initialized", yes_no(out.initialized)),
        ("link", show(out.link_up.map(yes_no))),
        ("mac", show(out.mac.map(|m| m.to_string()))),
    ];
    if let Some(config) = &out.ip_config {
        fields.push(("ip", config.ip.to_string()));
        fields.push(("gateway", config.gateway.to_string()));
        fields.push(("subnet", config.subnet.to_string()));
        fields.push(("dns", config.dns.to_string()));
    }
    print_record("Ethernet", &out, &fields, format);
    Ok(SUCCESS)
}

fn not_initialized_as_none<T>(
    result: Result<T, OperationError>,
) -> Result<Option<T>, OperationError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.status() == Some(Status::NotInitialized) => Ok(None),
        Err(err) => Err(err),
    }
}
