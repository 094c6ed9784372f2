use serde::Serialize;

use crate::cmd::{DnsArgs, LinkArgs};
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat};

#[derive(Serialize)]
struct DnsOutput {
    hostname: String,
    address: String,
}

pub fn run(args: DnsArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let address = client
        .udp()
        .dns_resolve(&args.hostname)
        .map_err(|err| op_error(&format!("resolve {}", args.hostname), err))?;

    let out = DnsOutput {
        hostname: args.hostname,
        address: address.to_string(),
    };
    print_record(
        "DNS",
        &out,
        &[
            ("hostname", out.hostname.clone()),
            ("address", out.address.clone()),
        ],
        format,
    );
    Ok(SUCCESS)
}
