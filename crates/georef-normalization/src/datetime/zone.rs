//! Time zone identifiers of date/time references.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use super::pattern::PatternError;

/// A resolved time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    /// Resolve `UTC`/`GMT`/`Z`, fixed offsets (`+05:30`, `UTC-3`) or IANA
    /// names (`America/Chicago`).
    pub fn resolve(id: &str) -> Result<Self, PatternError> {
        let id = id.trim();
        let unresolved = || PatternError::UnresolvedTimeZone(id.to_string());
        if ["UTC", "GMT", "Z", "UT"]
            .iter()
            .any(|utc| id.eq_ignore_ascii_case(utc))
        {
            return Ok(Self::Fixed(FixedOffset::east_opt(0).ok_or_else(unresolved)?));
        }
        let offset_part = ["UTC", "GMT"]
            .iter()
            .find_map(|prefix| strip_prefix_ignore_case(id, prefix))
            .unwrap_or(id);
        if offset_part.starts_with('+') || offset_part.starts_with('-') {
            return fixed_offset(offset_part)
                .map(Self::Fixed)
                .ok_or_else(unresolved);
        }
        id.parse::<Tz>().map(Self::Named).map_err(|_| unresolved())
    }

    /// Interpret a local wall-clock time in this zone as a UTC instant.
    ///
    /// Ambiguous local times (DST fall-back) resolve to the earlier instant.
    pub fn to_utc(self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Fixed(offset) => offset
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Self::Named(tz) => tz
                .from_local_datetime(&local)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

/// `+hh`, `+h`, `+hh:mm` or `+hhmm`.
fn fixed_offset(text: &str) -> Option<FixedOffset> {
    let (sign, body) = match text.as_bytes().first()? {
        b'+' => (1, &text[1..]),
        b'-' => (-1, &text[1..]),
        _ => return None,
    };
    let (hours, minutes) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None if body.len() == 4 => body.split_at(2),
        None => (body, "0"),
    };
    if hours.is_empty() || hours.len() > 2 || !hours.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if minutes.is_empty() || minutes.len() > 2 || !minutes.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if hours > 18 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
