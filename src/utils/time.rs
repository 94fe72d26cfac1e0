use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date-time layouts without an offset. These are read as wall time in the configured offset.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// This is the standard way of converting a date to a string in daystreak.
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parses an ISO-8601 timestamp into an instant.
///
/// Values carrying an offset (`Z`, `+09:00`, `+0900`) are taken as is. Values without one are
/// wall time in `offset`. A bare date is UTC midnight, which is how browsers read `2024-02-01`
/// and how the old data was written. Anything else yields `None`.
pub fn parse_timestamp(value: &str, offset: &FixedOffset) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(v) = DateTime::parse_from_rfc3339(value) {
        return Some(v.with_timezone(&Utc));
    }
    if let Ok(v) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(v.with_timezone(&Utc));
    }
    for format in LOCAL_FORMATS {
        if let Ok(v) = NaiveDateTime::parse_from_str(value, format) {
            return offset
                .from_local_datetime(&v)
                .single()
                .map(|v| v.with_timezone(&Utc));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|v| Utc.from_utc_datetime(&v.and_time(chrono::NaiveTime::MIN)))
}

/// Parses `Z`, `UTC`, `+HH:MM`, `-HH:MM`, `+HHMM` or `+HH` into a fixed offset.
pub fn parse_utc_offset(value: &str) -> Result<FixedOffset> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") {
        return Ok(FixedOffset::east_opt(0).expect("zero offset is always valid"));
    }

    let (sign, rest) = match value.split_at_checked(1) {
        Some(("+", rest)) => (1, rest),
        Some(("-", rest)) => (-1, rest),
        _ => bail!("Offset {value:?} should start with + or -"),
    };

    let digits = rest.replace(':', "");
    let (hours, minutes) = match digits.len() {
        2 => (digits.as_str(), "0"),
        4 => digits.split_at(2),
        _ => bail!("Offset {value:?} should look like +HH:MM"),
    };
    let hours: i32 = hours.parse()?;
    let minutes: i32 = minutes.parse()?;
    if hours > 23 || minutes > 59 {
        bail!("Offset {value:?} is out of range");
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| anyhow!("Offset {value:?} is out of range"))
}
