use std::thread;
use std::time::{Duration, Instant};

use atbridge_client::{BridgeClient, OpResult, UdpDatagram};
use atbridge_transport::Link;
use serde::Serialize;

use crate::cmd::{parse_duration, LinkArgs, UdpSendArgs};
use crate::exit::{op_error, CliResult, SUCCESS};
use crate::output::{payload_preview, print_record, OutputFormat};

/// Largest datagram pulled back with `--reply`.
const REPLY_MAX_LEN: u16 = 512;
const REPLY_POLL: Duration = Duration::from_millis(50);

#[derive(Serialize)]
struct UdpSendOutput {
    socket: u8,
    dest: String,
    bytes_sent: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply: Option<ReplyOutput>,
}

#[derive(Serialize)]
struct ReplyOutput {
    source: String,
    len: usize,
    data: String,
}

impl From<UdpDatagram> for ReplyOutput {
    fn from(datagram: UdpDatagram) -> Self {
        Self {
            source: datagram.source.to_string(),
            len: datagram.data.len(),
            data: payload_preview(&datagram.data),
        }
    }
}

pub fn run(args: UdpSendArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let wait = parse_duration(&link.timeout)?;
    let mut client = link.connect()?;
    let local_port = args.local_port.unwrap_or(args.dest.port());

    client
        .udp()
        .begin(args.socket, local_port)
        .map_err(|err| op_error("udp begin", err))?;
    let exchanged = send_and_wait(&mut client, &args, wait);
    // Release the socket even when the send failed.
    let closed = client.udp().close(args.socket);
    let (bytes_sent, reply) = exchanged?;
    closed.map_err(|err| op_error("udp close", err))?;

    let out = UdpSendOutput {
        socket: args.socket,
        dest: args.dest.to_string(),
        bytes_sent,
        reply: reply.map(ReplyOutput::from),
    };
    let mut fields = vec![
        ("socket", out.socket.to_string()),
        ("dest", out.dest.clone()),
        ("bytes sent", out.bytes_sent.to_string()),
    ];
    if args.reply {
        match &out.reply {
            Some(reply) => {
                fields.push(("reply from", reply.source.clone()));
                fields.push(("reply", reply.data.clone()));
            }
            None => fields.push(("reply", "(none)".to_string())),
        }
    }
    print_record("UDP Send", &out, &fields, format);
    Ok(SUCCESS)
}

fn send_and_wait<L: Link>(
    client: &mut BridgeClient<L>,
    args: &UdpSendArgs,
    wait: Duration,
) -> CliResult<(u16, Option<UdpDatagram>)> {
    let mut udp = client.udp();
    let sent = udp
        .send(args.socket, args.dest, args.data.as_bytes())
        .map_err(|err| op_error("udp send", err))?;
    if !args.reply {
        return Ok((sent, None));
    }
    let reply = poll_receive(wait, || udp.receive(args.socket, REPLY_MAX_LEN))
        .map_err(|err| op_error("udp receive", err))?;
    Ok((sent, reply))
}

/// Call `receive` until it yields a datagram or `wait` has passed.
fn poll_receive<F>(wait: Duration, mut receive: F) -> OpResult<Option<UdpDatagram>>
where
    F: FnMut() -> OpResult<Option<UdpDatagram>>,
{
    let deadline = Instant::now() + wait;
    loop {
        if let Some(datagram) = receive()? {
            return Ok(Some(datagram));
        }
        if Instant::now() >= deadline {
            return Ok(None);
        }
        thread::sleep(REPLY_POLL);
    }
}
