use atbridge_client::{BridgeClient, OperationError};
use atbridge_frame::Status;
use atbridge_transport::Link;
use serde::Serialize;

use crate::cmd::{CheckArgs, LinkArgs};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Warn,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }

    fn failed(name: &'static str, err: &OperationError) -> Self {
        Self::new(name, CheckStatus::Fail, err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    port: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(args: CheckArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let checks = run_checks(&mut client, &args);
    let _ = client.close();

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let report = CheckReport {
        port: link.port.clone(),
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };
    print_report(&report, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn run_checks<L: Link>(client: &mut BridgeClient<L>, args: &CheckArgs) -> Vec<CheckResult> {
    let mut checks = Vec::new();

    checks.push(match client.system().ping() {
        Ok(()) => CheckResult::new("ping", CheckStatus::Pass, "PONG"),
        Err(err) => CheckResult::failed("ping", &err),
    });

    checks.push(match client.system().version() {
        Ok(version) => CheckResult::new("firmware", CheckStatus::Info, version.to_string()),
        Err(err) => CheckResult::failed("firmware", &err),
    });

    let status = client.system().status();
    let rtc_present = status.as_ref().map(|s| s.rtc_present).unwrap_or(true);
    checks.push(match &status {
        Ok(s) => CheckResult::new(
            "status",
            CheckStatus::Pass,
            format!("uptime {}s, {} bytes free", s.uptime().as_secs(), s.free_ram),
        ),
        Err(err) => CheckResult::failed("status", err),
    });

    checks.push(if rtc_present {
        match client.rtc().datetime() {
            Ok(now) => CheckResult::new("rtc", CheckStatus::Pass, now.to_string()),
            Err(err) => CheckResult::failed("rtc", &err),
        }
    } else {
        CheckResult::new("rtc", CheckStatus::Skip, "no RTC fitted")
    });

    checks.push(match client.i2c().scan() {
        Ok(found) => CheckResult::new(
            "i2c",
            CheckStatus::Info,
            format!("{} device(s) on the bus", found.len()),
        ),
        Err(err) => CheckResult::failed("i2c", &err),
    });

    if args.skip_network {
        checks.push(CheckResult::new("eth_link", CheckStatus::Skip, "--skip-network"));
        checks.push(CheckResult::new("dns", CheckStatus::Skip, "--skip-network"));
        return checks;
    }

    let link = match client.ethernet().link_status() {
        Ok(true) => CheckResult::new("eth_link", CheckStatus::Pass, "cable link up"),
        Ok(false) => CheckResult::new("eth_link", CheckStatus::Warn, "no cable link"),
        Err(err) if err.status() == Some(Status::NotInitialized) => {
            CheckResult::new("eth_link", CheckStatus::Warn, "ethernet not initialized")
        }
        Err(err) => CheckResult::failed("eth_link", &err),
    };
    let link_up = link.status == CheckStatus::Pass;
    checks.push(link);

    checks.push(if link_up {
        match client.udp().dns_resolve(&args.dns_host) {
            Ok(addr) => CheckResult::new(
                "dns",
                CheckStatus::Pass,
                format!("{} -> {addr}", args.dns_host),
            ),
            Err(err) => CheckResult::failed("dns", &err),
        }
    } else {
        CheckResult::new("dns", CheckStatus::Skip, "ethernet link is down")
    });

    checks
}

fn print_report(report: &CheckReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("atbridge check ({})\n", report.port);
            for c in &report.checks {
                println!("  [{:>4}] {:<10} {}", status_text(c.status), c.name, c.detail);
            }
            if report.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Warn => "WARN",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

#[cfg(test)]
mod tests {
    use atbridge_frame::encode;
    use atbridge_transport::MemoryLink;

    use super::*;

    fn args(skip_network: bool) -> CheckArgs {
        CheckArgs {
            skip_network,
            dns_host: "example.com".into(),
        }
    }

    /// A healthy bridge with Ethernet up and an RTC fitted.
    fn healthy_bridge() -> MemoryLink {
        MemoryLink::with_responder(|request| {
            let command = request[1];
            let body: &[u8] = match command {
                0x00 => b"\x00PONG",
                0x01 => &[0x00, 1, 4, 2],
                0x03 => &[0x00, 1, 1, 1, 0, 2, 5, 0x00, 0x40],
                0x17 => &[0x00, 1],
                0x25 => &[0x00, 93, 184, 216, 34],
                0x44 => &[0x00, 26, 10, 14, 4, 9, 30, 0],
                0x50 => &[0x00, 2, 0x3C, 0x68],
                _ => &[0x02],
            };
            encode(command | 0x80, body).ok().map(|wire| wire.to_vec())
        })
    }

    fn find<'a>(checks: &'a [CheckResult], name: &str) -> &'a CheckResult {
        checks.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn healthy_bridge_passes() {
        let mut client = BridgeClient::new(healthy_bridge());
        let checks = run_checks(&mut client, &args(false));

        assert!(checks.iter().all(|c| c.status != CheckStatus::Fail));
        assert_eq!(find(&checks, "firmware").detail, "1.4.2");
        assert_eq!(find(&checks, "status").detail, "uptime 125s, 64 bytes free");
        assert_eq!(find(&checks, "rtc").detail, "2026-10-14 09:30:00");
        assert_eq!(find(&checks, "i2c").detail, "2 device(s) on the bus");
        assert_eq!(find(&checks, "dns").detail, "example.com -> 93.184.216.34");
    }

    #[test]
    fn skip_network_skips_ethernet_and_dns() {
        let link = healthy_bridge();
        let mut client = BridgeClient::new(link.clone());
        let checks = run_checks(&mut client, &args(true));

        assert_eq!(find(&checks, "eth_link").status, CheckStatus::Skip);
        assert_eq!(find(&checks, "dns").status, CheckStatus::Skip);
        // ping, version, status, rtc, i2c
        assert_eq!(link.write_count(), 5);
    }

    #[test]
    fn uninitialized_ethernet_warns_and_skips_dns() {
        let link = MemoryLink::with_responder(|request| {
            let command = request[1];
            let body: &[u8] = match command {
                0x00 => b"\x00PONG",
                0x01 => &[0x00, 1, 0, 0],
                0x03 => &[0x00, 0, 0, 0, 0, 0, 1, 0x01, 0x00],
                0x50 => &[0x00, 0],
                _ => &[0x06],
            };
            encode(command | 0x80, body).ok().map(|wire| wire.to_vec())
        });
        let mut client = BridgeClient::new(link);
        let checks = run_checks(&mut client, &args(false));

        assert_eq!(find(&checks, "rtc").status, CheckStatus::Skip);
        assert_eq!(find(&checks, "eth_link").status, CheckStatus::Warn);
        assert_eq!(find(&checks, "eth_link").detail, "ethernet not initialized");
        assert_eq!(find(&checks, "dns").status, CheckStatus::Skip);
        assert!(checks.iter().all(|c| c.status != CheckStatus::Fail));
    }

    #[test]
    fn silent_bridge_fails() {
        let mut client = BridgeClient::new(MemoryLink::new());
        let checks = run_checks(&mut client, &args(true));

        assert_eq!(find(&checks, "ping").status, CheckStatus::Fail);
        assert_eq!(find(&checks, "firmware").status, CheckStatus::Fail);
        assert!(client.is_open());
    }

    #[test]
    fn report_serializes_lowercase_status() {
        let report = CheckReport {
            port: "/dev/ttyUSB0".into(),
            checks: vec![CheckResult::new("ping", CheckStatus::Pass, "PONG")],
            overall: "pass",
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["checks"][0]["status"], "pass");
        assert_eq!(json["overall"], "pass");
    }
}
