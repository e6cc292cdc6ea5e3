//! ISO 8601 calendar durations ("P1D", "PT1H", "P1Y2M", ...)
//!
//! Durations are calendar-aware: shifting by `P1M` lands on the same day of
//! the next month in the given timezone, and flooring happens on local
//! wall-clock time.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::TimeError;
use super::from_local;

const MINUTE_MS: i64 = 60 * 1000;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Longest duration accepted when parsing, in nominal years
const MAX_YEARS: i64 = 10_000;
const MAX_MS: i64 = MAX_YEARS * 365 * DAY_MS;

/// A single calendar unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DurationUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// An ISO 8601 duration made of calendar components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl Duration {
    /// A duration consisting of `value` units of `unit`
    pub fn of(value: u32, unit: DurationUnit) -> Self {
        let mut d = Duration::default();
        match unit {
            DurationUnit::Second => d.seconds = value,
            DurationUnit::Minute => d.minutes = value,
            DurationUnit::Hour => d.hours = value,
            DurationUnit::Day => d.days = value,
            DurationUnit::Week => d.weeks = value,
            DurationUnit::Month => d.months = value,
            DurationUnit::Year => d.years = value,
        }
        d
    }

    fn components(&self) -> [(DurationUnit, u32); 7] {
        [
            (DurationUnit::Year, self.years),
            (DurationUnit::Month, self.months),
            (DurationUnit::Week, self.weeks),
            (DurationUnit::Day, self.days),
            (DurationUnit::Hour, self.hours),
            (DurationUnit::Minute, self.minutes),
            (DurationUnit::Second, self.seconds),
        ]
    }

    pub fn is_zero(&self) -> bool {
        self.components().iter().all(|(_, v)| *v == 0)
    }

    /// The unit and count when exactly one component is set
    pub fn single_span(&self) -> Option<(DurationUnit, u32)> {
        let mut non_zero = self.components().into_iter().filter(|(_, v)| *v > 0);
        let first = non_zero.next()?;
        match non_zero.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Nominal length in milliseconds (months count as 30 days, years as 365).
    ///
    /// Saturates at `i64::MAX`.
    pub fn approximate_millis(&self) -> i64 {
        [
            (self.years, 365 * DAY_MS),
            (self.months, 30 * DAY_MS),
            (self.weeks, 7 * DAY_MS),
            (self.days, DAY_MS),
            (self.hours, HOUR_MS),
            (self.minutes, MINUTE_MS),
            (self.seconds, 1000),
        ]
        .into_iter()
        .fold(0i64, |total, (value, unit_ms)| {
            total.saturating_add(i64::from(value).saturating_mul(unit_ms))
        })
    }

    /// Floor an instant to this duration in the given timezone.
    ///
    /// Composite durations floor by their smallest component unit.
    pub fn floor(&self, t: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
        let (unit, n) = match self.single_span() {
            Some(span) => span,
            None => match self.components().into_iter().rev().find(|(_, v)| *v > 0) {
                Some((unit, _)) => (unit, 1),
                None => return t,
            },
        };
        let local = t.with_timezone(&tz).naive_local();
        match floor_local(local, unit, n) {
            Some(floored) => from_local(tz, floored),
            None => t,
        }
    }

    /// Move an instant by `step` times this duration.
    ///
    /// Calendar components are applied on local wall-clock time, clock
    /// components on absolute time. `None` when the result falls outside
    /// the representable range.
    pub fn shift(&self, t: DateTime<Utc>, tz: Tz, step: i32) -> Option<DateTime<Utc>> {
        let step = i64::from(step);
        let months = (i64::from(self.years) * 12 + i64::from(self.months)).checked_mul(step)?;
        let days = (i64::from(self.weeks) * 7 + i64::from(self.days)).checked_mul(step)?;
        let seconds = (i64::from(self.hours) * 3600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds))
        .checked_mul(step)?;

        let mut result = t;
        if months != 0 || days != 0 {
            let local = t.with_timezone(&tz).naive_local();
            let month_count = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
            let local = if months >= 0 {
                local.checked_add_months(month_count)
            } else {
                local.checked_sub_months(month_count)
            }?;
            let local = local.checked_add_signed(TimeDelta::try_days(days)?)?;
            result = from_local(tz, local);
        }
        result.checked_add_signed(TimeDelta::try_seconds(seconds)?)
    }
}

fn floor_local(local: NaiveDateTime, unit: DurationUnit, n: u32) -> Option<NaiveDateTime> {
    let n = n.max(1);
    let date = local.date();
    match unit {
        DurationUnit::Second => date.and_hms_opt(
            local.hour(),
            local.minute(),
            local.second() - local.second() % n,
        ),
        DurationUnit::Minute => {
            date.and_hms_opt(local.hour(), local.minute() - local.minute() % n, 0)
        }
        DurationUnit::Hour => date.and_hms_opt(local.hour() - local.hour() % n, 0, 0),
        DurationUnit::Day => {
            let day0 = date.day0() - date.day0() % n;
            NaiveDate::from_ymd_opt(date.year(), date.month(), day0 + 1)?.and_hms_opt(0, 0, 0)
        }
        DurationUnit::Week => {
            let back = i64::from(date.weekday().num_days_from_monday());
            (date - chrono::Duration::days(back)).and_hms_opt(0, 0, 0)
        }
        DurationUnit::Month => {
            let month0 = date.month0() - date.month0() % n;
            NaiveDate::from_ymd_opt(date.year(), month0 + 1, 1)?.and_hms_opt(0, 0, 0)
        }
        DurationUnit::Year => {
            let year = date.year() - date.year().rem_euclid(n as i32);
            NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "P0D");
        }
        write!(f, "P")?;
        for (value, suffix) in [
            (self.years, 'Y'),
            (self.months, 'M'),
            (self.weeks, 'W'),
            (self.days, 'D'),
        ] {
            if value > 0 {
                write!(f, "{}{}", value, suffix)?;
            }
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            for (value, suffix) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if value > 0 {
                    write!(f, "{}{}", value, suffix)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for Duration {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: &str| TimeError::InvalidDuration {
            input: s.to_string(),
            message: message.to_string(),
        };

        let body = s
            .strip_prefix('P')
            .ok_or_else(|| invalid("must start with 'P'"))?;
        if body.is_empty() || body == "T" {
            return Err(invalid("no components"));
        }

        let mut duration = Duration::default();
        let mut in_time = false;
        let mut digits = String::new();
        let mut seen_any = false;

        for c in body.chars() {
            if c.is_ascii_digit() {
                digits.push(c);
                continue;
            }
            if c == 'T' {
                if in_time || !digits.is_empty() {
                    return Err(invalid("misplaced 'T'"));
                }
                in_time = true;
                continue;
            }
            if digits.is_empty() {
                return Err(invalid("unit without a value"));
            }
            let value: u32 = digits.parse().map_err(|_| invalid("value out of range"))?;
            digits.clear();
            let slot = match (in_time, c) {
                (false, 'Y') => &mut duration.years,
                (false, 'M') => &mut duration.months,
                (false, 'W') => &mut duration.weeks,
                (false, 'D') => &mut duration.days,
                (true, 'H') => &mut duration.hours,
                (true, 'M') => &mut duration.minutes,
                (true, 'S') => &mut duration.seconds,
                _ => return Err(invalid(&format!("unexpected unit '{}'", c))),
            };
            *slot = value;
            seen_any = true;
        }

        if !digits.is_empty() {
            return Err(invalid("trailing value without a unit"));
        }
        if !seen_any {
            return Err(invalid("no components"));
        }
        if duration.approximate_millis() > MAX_MS {
            return Err(invalid(&format!("longer than {} years", MAX_YEARS)));
        }
        Ok(duration)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Duration::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Duration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
