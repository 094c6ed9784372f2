use std::time::Instant;

use serde::Serialize;

use crate::cmd::LinkArgs;
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{print_record, yes_no, OutputFormat};

#[derive(Serialize)]
struct PingOutput<'a> {
    port: &'a str,
    reply: &'static str,
    latency_ms: f64,
}

pub fn ping(link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let started = Instant::now();
    client.system().ping().map_err(|err| op_error("ping", err))?;
    let latency_ms = (started.elapsed().as_secs_f64() * 1000.0 * 100.0).round() / 100.0;

    let out = PingOutput {
        port: &link.port,
        reply: "PONG",
        latency_ms,
    };
    print_record(
        "Ping",
        &out,
        &[
            ("port", out.port.to_string()),
            ("reply", out.reply.to_string()),
            ("latency", format!("{latency_ms:.2}ms")),
        ],
        format,
    );
    Ok(SUCCESS)
}

pub fn firmware(link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let version = client
        .system()
        .version()
        .map_err(|err| op_error("firmware version", err))?;

    print_record(
        "Firmware",
        &version,
        &[("version", version.to_string())],
        format,
    );
    Ok(SUCCESS)
}

pub fn status(link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let status = client
        .system()
        .status()
        .map_err(|err| op_error("status", err))?;

    let uptime = status.uptime().as_secs();
    print_record(
        "Bridge Status",
        &status,
        &[
            ("ethernet initialized", yes_no(status.eth_initialized)),
            ("ethernet link", yes_no(status.eth_link_up)),
            ("rtc present", yes_no(status.rtc_present)),
            (
                "uptime",
                format!(
                    "{:02}:{:02}:{:02} ({uptime}s)",
                    status.uptime_hours, status.uptime_minutes, status.uptime_seconds
                ),
            ),
            ("free ram", format!("{} bytes", status.free_ram)),
        ],
        format,
    );
    Ok(SUCCESS)
}
