use atbridge_frame::Command;
use atbridge_transport::Link;

use crate::client::BridgeClient;
use crate::error::{OpResult, OperationError};
use crate::response::Response;
use crate::types::{Date, DateTime, TimeOfDay};

/// Real-time clock commands.
pub struct Rtc<'a, L: Link> {
    client: &'a mut BridgeClient<L>,
}

impl<'a, L: Link> Rtc<'a, L> {
    pub(crate) fn new(client: &'a mut BridgeClient<L>) -> Self {
        Self { client }
    }

    pub fn datetime(&mut self) -> OpResult<DateTime> {
        let mut resp = self.client.call(Command::RtcGetDatetime, &[], None)?;
        resp.require(7)?;
        let date = read_date(&mut resp)?;
        let time = read_time(&mut resp)?;
        Ok(DateTime { date, time })
    }

    pub fn set_datetime(&mut self, value: DateTime) -> OpResult<()> {
        value.date.validate().map_err(OperationError::InvalidArgument)?;
        value.time.validate().map_err(OperationError::InvalidArgument)?;
        let req = [
            value.date.year_offset(),
            value.date.month,
            value.date.day,
            value.date.weekday,
            value.time.hour,
            value.time.minute,
            value.time.second,
        ];
        self.client.call(Command::RtcSetDatetime, &req, None)?;
        Ok(())
    }

    pub fn time(&mut self) -> OpResult<TimeOfDay> {
        let mut resp = self.client.call(Command::RtcGetTime, &[], None)?;
        read_time(&mut resp)
    }

    pub fn set_time(&mut self, value: TimeOfDay) -> OpResult<()> {
        value.validate().map_err(OperationError::InvalidArgument)?;
        let req = [value.hour, value.minute, value.second];
        self.client.call(Command::RtcSetTime, &req, None)?;
        Ok(())
    }

    pub fn date(&mut self) -> OpResult<Date> {
        let mut resp = self.client.call(Command::RtcGetDate, &[], None)?;
        read_date(&mut resp)
    }

    pub fn set_date(&mut self, value: Date) -> OpResult<()> {
        value.validate().map_err(OperationError::InvalidArgument)?;
        let req = [value.year_offset(), value.month, value.day, value.weekday];
        self.client.call(Command::RtcSetDate, &req, None)?;
        Ok(())
    }
}

fn read_date(resp: &mut Response) -> OpResult<Date> {
    resp.require(4)?;
    Ok(Date {
        year: 2000 + u16::from(resp.u8()?),
        month: resp.u8()?,
        day: resp.u8()?,
        weekday: resp.u8()?,
    })
}

fn read_time(resp: &mut Response) -> OpResult<TimeOfDay> {
    resp.require(3)?;
    Ok(TimeOfDay {
        hour: resp.u8()?,
        minute: resp.u8()?,
        second: resp.u8()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::tests::{last_request, scripted};

    #[test]
    fn datetime_decodes_year_offset() {
        let (mut client, link) = scripted(|_, _| vec![0x00, 26, 10, 14, 4, 9, 30, 0]);
        let dt = client.rtc().datetime().unwrap();
        assert_eq!(dt.to_string(), "2026-10-14 09:30:00");
        assert_eq!(dt.date.weekday, 4);
        assert_eq!(last_request(&link).0, 0x44);
    }

    #[test]
    fn set_datetime_layout() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        let dt: DateTime = "2024-02-29 13:05:09".parse().unwrap();
        client.rtc().set_datetime(dt).unwrap();
        assert_eq!(last_request(&link), (0x45, vec![24, 2, 29, 5, 13, 5, 9]));
    }

    #[test]
    fn set_rejects_invalid_values_without_sending() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        let err = client
            .rtc()
            .set_time(TimeOfDay {
                hour: 24,
                minute: 0,
                second: 0,
            })
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidArgument(_)));

        let err = client
            .rtc()
            .set_date(Date {
                year: 2024,
                month: 1,
                day: 1,
                weekday: 0,
            })
            .unwrap_err();
        assert!(matches!(err, OperationError::InvalidArgument(_)));
        assert_eq!(link.write_count(), 0);
    }

    #[test]
    fn impossible_dates_are_not_sent() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        for (year, month, day) in [(2023, 2, 29), (2023, 4, 31), (2023, 2, 31)] {
            let date = Date {
                year,
                month,
                day,
                weekday: 1,
            };
            let err = client.rtc().set_date(date).unwrap_err();
            assert!(matches!(err, OperationError::InvalidArgument(_)), "{date}");

            let err = client
                .rtc()
                .set_datetime(DateTime {
                    date,
                    time: TimeOfDay {
                        hour: 10,
                        minute: 0,
                        second: 0,
                    },
                })
                .unwrap_err();
            assert!(matches!(err, OperationError::InvalidArgument(_)), "{date}");
        }
        assert_eq!(link.write_count(), 0);
    }

    #[test]
    fn leap_day_is_accepted() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        client.rtc().set_date(Date::from_ymd(2028, 2, 29).unwrap()).unwrap();
        assert_eq!(last_request(&link), (0x43, vec![28, 2, 29, 3]));
    }

    #[test]
    fn time_and_date() {
        let (mut client, link) = scripted(|cmd, _| match cmd {
            0x40 => vec![0x00, 23, 59, 58],
            _ => vec![0x00, 0, 1, 1, 7],
        });
        let time = client.rtc().time().unwrap();
        assert_eq!(time.to_string(), "23:59:58");
        let date = client.rtc().date().unwrap();
        assert_eq!(date.to_string(), "2000-01-01");
        assert_eq!(date.weekday, 7);
        assert_eq!(last_request(&link).0, 0x42);
    }

    #[test]
    fn set_time_and_date_layout() {
        let (mut client, link) = scripted(|_, _| vec![0x00]);
        client
            .rtc()
            .set_time(TimeOfDay {
                hour: 7,
                minute: 8,
                second: 9,
            })
            .unwrap();
        assert_eq!(last_request(&link), (0x41, vec![7, 8, 9]));

        client
            .rtc()
            .set_date(Date {
                year: 2031,
                month: 12,
                day: 31,
                weekday: 4,
            })
            .unwrap();
        assert_eq!(last_request(&link), (0x43, vec![31, 12, 31, 4]));
    }

    #[test]
    fn short_datetime() {
        let (mut client, _) = scripted(|_, _| vec![0x00, 26, 10, 14]);
        assert!(matches!(
            client.rtc().datetime(),
            Err(OperationError::ShortResponse {
                expected: 8,
                actual: 4,
                ..
            })
        ));
    }
}
