use atbridge_client::TcpState;
use serde::Serialize;

use crate::cmd::{LinkArgs, TcpStatusArgs};
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{print_record, yes_no, OutputFormat};

#[derive(Serialize)]
struct TcpStatusOutput {
    socket: u8,
    state: TcpState,
    state_code: u8,
    established: bool,
    available: u16,
}

pub fn run(args: TcpStatusArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let mut tcp = client.tcp();
    let state = tcp
        .status(args.socket)
        .map_err(|err| op_error("tcp status", err))?;
    let available = tcp
        .available(args.socket)
        .map_err(|err| op_error("tcp available", err))?;

    let out = TcpStatusOutput {
        socket: args.socket,
        state,
        state_code: state.0,
        established: state.is_established(),
        available,
    };
    print_record(
        "TCP Socket",
        &out,
        &[
            ("socket", out.socket.to_string()),
            ("state", out.state.to_string()),
            ("established", yes_no(out.established)),
            ("available", format!("{} bytes", out.available)),
        ],
        format,
    );
    Ok(SUCCESS)
}
