use atbridge_client::DateTime;
use chrono::Utc;

use crate::cmd::{LinkArgs, RtcCommand, RtcSetArgs};
use crate::exit::{op_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::output::{print_record, OutputFormat};

const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub fn run(command: RtcCommand, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        RtcCommand::Get => get(link, format),
        RtcCommand::Set(args) => set(args, link, format),
    }
}

fn get(link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = link.connect()?;
    let now = client
        .rtc()
        .datetime()
        .map_err(|err| op_error("rtc get", err))?;
    print_datetime("RTC", &now, format);
    Ok(SUCCESS)
}

fn set(args: RtcSetArgs, link: &LinkArgs, format: OutputFormat) -> CliResult<i32> {
    let value = match args.datetime {
        Some(value) => value,
        None if args.now => host_now_utc()?,
        None => return Err(CliError::new(USAGE, "pass a date and time or --now")),
    };

    let mut client = link.connect()?;
    client
        .rtc()
        .set_datetime(value)
        .map_err(|err| op_error("rtc set", err))?;
    print_datetime("RTC set", &value, format);
    Ok(SUCCESS)
}

fn print_datetime(title: &str, value: &DateTime, format: OutputFormat) {
    let weekday = usize::from(value.date.weekday)
        .checked_sub(1)
        .and_then(|i| WEEKDAYS.get(i))
        .copied()
        .unwrap_or("?");
    print_record(
        title,
        value,
        &[
            ("date", value.date.to_string()),
            ("time", value.time.to_string()),
            ("weekday", weekday.to_string()),
        ],
        format,
    );
}

fn host_now_utc() -> CliResult<DateTime> {
    DateTime::try_from(Utc::now().naive_utc())
        .map_err(|err| CliError::new(INTERNAL, format!("host clock: {err}")))
}
