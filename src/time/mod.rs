//! Time primitives shared by clauses, splits and time shifts.
//!
//! Nothing in here reads the system clock. "Now" and the per-cube max
//! ingested time always arrive through a [`Timekeeper`].

mod duration;
mod error;
mod timekeeper;

pub use duration::{Duration, DurationUnit};
pub use error::TimeError;
pub use timekeeper::Timekeeper;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Parse an IANA timezone name ("UTC", "America/New_York", ...)
pub fn parse_timezone(name: &str) -> Result<Tz, TimeError> {
    name.parse::<Tz>()
        .map_err(|_| TimeError::UnknownTimezone(name.to_string()))
}

/// Convert a local wall-clock time back to an instant.
///
/// Ambiguous local times resolve to the earlier instant; times that fall in a
/// DST gap are interpreted as UTC wall-clock.
pub(crate) fn from_local(tz: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("UTC").unwrap(), Tz::UTC);
        assert_eq!(parse_timezone("Europe/Warsaw").unwrap().name(), "Europe/Warsaw");
        assert!(matches!(
            parse_timezone("Mars/Olympus"),
            Err(TimeError::UnknownTimezone(name)) if name == "Mars/Olympus"
        ));
    }
}
