use chrono::{DateTime, Days, LocalResult, NaiveDate, NaiveTime, TimeZone};
use tracing::debug;

use crate::models::{parse_time_of_day, ReminderError, RepeatInterval, ScheduleRequest};

/// Builds daily alarm requests anchored at a local time of day.
pub struct ReminderSchedule;

impl ReminderSchedule {
    /// Next occurrence of `time` (`HH:mm`) in `now`'s time zone: today if it
    /// has not passed yet, otherwise tomorrow.
    pub fn next_daily<Tz: TimeZone>(
        identifier: &str,
        display_name: &str,
        time: &str,
        now: &DateTime<Tz>,
    ) -> Result<ScheduleRequest, ReminderError> {
        let time_of_day = parse_time_of_day(time)?;
        let zone = now.timezone();
        let today = now.date_naive();

        let mut fire_at = resolve(&zone, today, time_of_day)?;
        if fire_at < *now {
            let tomorrow = today
                .checked_add_days(Days::new(1))
                .ok_or_else(|| ReminderError::UnrepresentableTime(time.to_string()))?;
            fire_at = resolve(&zone, tomorrow, time_of_day)?;
        }

        debug!("Reminder {} next fires at {}", identifier, fire_at.timestamp_millis());

        Ok(ScheduleRequest {
            id: identifier.to_string(),
            display_name: display_name.to_string(),
            fire_at_epoch_millis: fire_at.timestamp_millis(),
            interval: RepeatInterval::Daily,
        })
    }
}

fn resolve<Tz: TimeZone>(zone: &Tz, date: NaiveDate, time: NaiveTime) -> Result<DateTime<Tz>, ReminderError> {
    let local = date.and_time(time);
    match zone.from_local_datetime(&local) {
        LocalResult::Single(dt) => Ok(dt),
        // Repeated wall-clock hour: fire on the first pass.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(ReminderError::UnrepresentableTime(local.to_string())),
    }
}
