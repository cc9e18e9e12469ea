//! Calendar arithmetic for the date macros.
//!
//! All instants are naive: the caller decides which time zone "now" is in.
//! Every operation returns `None` when the result leaves chrono's range.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use crate::parser::ast::DateUnit;

pub(crate) fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// `instant` with every field finer than `unit` zeroed. Weeks start on
/// Monday.
pub(crate) fn truncate(instant: NaiveDateTime, unit: DateUnit) -> Option<NaiveDateTime> {
    let date = instant.date();
    Some(match unit {
        DateUnit::Year => start_of_day(NaiveDate::from_ymd_opt(date.year(), 1, 1)?),
        DateUnit::Month => start_of_day(date.with_day(1)?),
        DateUnit::Week => {
            let back = Days::new(u64::from(date.weekday().num_days_from_monday()));
            start_of_day(date.checked_sub_days(back)?)
        }
        DateUnit::Day => start_of_day(date),
        DateUnit::Hour => date.and_hms_opt(instant.hour(), 0, 0)?,
        DateUnit::Minute => date.and_hms_opt(instant.hour(), instant.minute(), 0)?,
        DateUnit::Second => date.and_hms_opt(instant.hour(), instant.minute(), instant.second())?,
    })
}

/// Move `instant` by `amount` calendar units.
pub(crate) fn shift(instant: NaiveDateTime, unit: DateUnit, amount: i64) -> Option<NaiveDateTime> {
    let delta = match unit {
        DateUnit::Year => return shift_months(instant, amount.checked_mul(12)?),
        DateUnit::Month => return shift_months(instant, amount),
        DateUnit::Week => TimeDelta::try_weeks(amount)?,
        DateUnit::Day => TimeDelta::try_days(amount)?,
        DateUnit::Hour => TimeDelta::try_hours(amount)?,
        DateUnit::Minute => TimeDelta::try_minutes(amount)?,
        DateUnit::Second => TimeDelta::try_seconds(amount)?,
    };
    instant.checked_add_signed(delta)
}

fn shift_months(instant: NaiveDateTime, amount: i64) -> Option<NaiveDateTime> {
    let months = Months::new(u32::try_from(amount.unsigned_abs()).ok()?);
    if amount >= 0 {
        instant.checked_add_months(months)
    } else {
        instant.checked_sub_months(months)
    }
}
