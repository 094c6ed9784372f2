//! Drives the client against an in-memory bridge simulation.
//!
//! Run with:
//!   cargo run -p atbridge --example simulated-bridge

use std::thread;

use atbridge::frame::{encode, Command, Status, FOOTER_SIZE, HEADER_SIZE, RESPONSE_FLAG};
use atbridge::transport::MemoryLink;
use atbridge::{BridgeClient, SharedClient};

/// Minimal firmware model: answers a handful of commands, rejects the rest.
fn firmware(request: &[u8]) -> Option<Vec<u8>> {
    let command = request[1];
    let payload = &request[HEADER_SIZE..request.len() - FOOTER_SIZE];

    let mut reply = vec![Status::Ok.code()];
    match Command::from_code(command) {
        Some(Command::Ping) => reply.extend_from_slice(b"PONG"),
        Some(Command::GetVersion) => reply.extend_from_slice(&[1, 0, 3]),
        Some(Command::GetStatus) => reply.extend_from_slice(&[1, 1, 1, 0, 12, 30, 0x02, 0x10]),
        Some(Command::I2cScan) => reply.extend_from_slice(&[2, 0x3C, 0x68]),
        Some(Command::UdpBegin) | Some(Command::UdpClose) => {}
        Some(Command::UdpSend) => {
            let data_len = payload.len().saturating_sub(7) as u16;
            reply.extend_from_slice(&data_len.to_be_bytes());
        }
        _ => reply = vec![Status::UnknownCommand.code()],
    }
    encode(command | RESPONSE_FLAG, &reply)
        .ok()
        .map(|wire| wire.to_vec())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let link = MemoryLink::with_responder(firmware);
    let mut client = BridgeClient::new(link.clone());

    client.system().ping()?;
    eprintln!("[client] ping ok");

    let version = client.system().version()?;
    let status = client.system().status()?;
    eprintln!(
        "[client] firmware {version}, uptime {:?}, {} bytes free",
        status.uptime(),
        status.free_ram
    );

    let devices = client.i2c().scan()?;
    eprintln!("[client] i2c devices: {devices:02X?}");

    let dest = "192.168.1.50:9000".parse()?;
    client.udp().begin(0, 9000)?;
    let sent = client.udp().send(0, dest, b"hello bridge")?;
    client.udp().close(0)?;
    eprintln!("[client] udp sent {sent} bytes to {dest}");

    match client.rtc().datetime() {
        Ok(now) => eprintln!("[client] rtc {now}"),
        Err(err) => eprintln!("[client] rtc refused: {err}"),
    }

    // One client, several threads: transactions are serialized.
    let shared = SharedClient::new(client);
    let workers: Vec<_> = (0..4)
        .map(|id| {
            let shared = shared.clone();
            thread::spawn(move || {
                for _ in 0..10 {
                    if let Err(err) = shared.lock().system().ping() {
                        eprintln!("[worker {id}] ping failed: {err}");
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        let _ = worker.join();
    }

    eprintln!("[client] {} frames written in total", link.write_count());
    Ok(())
}
