//! Date/time pattern compilation and parsing.
//!
//! Patterns use the letters common to OSDU frame-of-reference descriptors:
//!
//! | Letters | Meaning |
//! |---|---|
//! | `yyyy`, `yy` | year (two-digit years are 20xx) |
//! | `M`, `MM`, `MMM` | month number, or English abbreviation |
//! | `d`, `dd` | day of month |
//! | `H`, `HH` / `h`, `hh` + `a` | hour of day / clock hour with AM-PM |
//! | `m`, `mm`, `s`, `ss` | minute, second |
//! | `S…`, `f…` | fraction of second (exactly as many digits as letters) |
//! | `Z`, `X`, `XXX` | offset: `Z`, `±hh:mm`, `±hhmm` or `±hh` |
//! | `T`, `'text'` | literal text (`''` is a single quote) |
//!
//! Single-letter numeric fields accept one or two digits; doubled letters
//! require exactly two.
//!
//! Failures are classified so callers can report them precisely: a pattern
//! that cannot be compiled, a component out of range, a literal whose shape
//! does not match the pattern, and everything else.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("{reason}")]
    MalformedPattern { reason: String },

    #[error("Invalid value for {field} (valid values {range}): {value}")]
    ComponentOutOfRange {
        field: &'static str,
        range: String,
        value: String,
    },

    #[error("Text '{literal}' could not be parsed at index {index}")]
    StructuralMismatch { literal: String, index: usize },

    #[error("Unknown time zone '{0}'")]
    UnresolvedTimeZone(String),

    #[error("{0}")]
    Generic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Hour,
    ClockHour,
    Minute,
    Second,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Self::Year => "Year",
            Self::Month => "MonthOfYear",
            Self::Day => "DayOfMonth",
            Self::Hour => "HourOfDay",
            Self::ClockHour => "ClockHourOfAmPm",
            Self::Minute => "MinuteOfHour",
            Self::Second => "SecondOfMinute",
        }
    }

    fn range(self) -> (u32, u32) {
        match self {
            Self::Year => (0, 9999),
            Self::Month => (1, 12),
            Self::Day => (1, 31),
            Self::Hour => (0, 23),
            Self::ClockHour => (1, 12),
            Self::Minute | Self::Second => (0, 59),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    /// Numeric field with minimum and maximum digit counts.
    Number { field: Field, min: usize, max: usize },
    TwoDigitYear,
    MonthAbbreviation,
    Fraction(usize),
    AmPm,
    Offset,
}

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// A compiled date/time pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimePattern {
    tokens: Vec<Token>,
}

/// The components read from a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDateTime {
    pub date: NaiveDate,
    /// Time of day, when the pattern has any time field.
    pub time: Option<NaiveTime>,
    /// Offset written in the literal itself.
    pub offset: Option<FixedOffset>,
}

#[derive(Debug, Default)]
struct Components {
    year: Option<u32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: Option<u32>,
    clock_hour: Option<u32>,
    minute: Option<u32>,
    second: Option<u32>,
    nanosecond: Option<u32>,
    pm: Option<bool>,
    offset_seconds: Option<i32>,
}

impl DateTimePattern {
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut pos = 0;
        while pos < chars.len() {
            let c = chars[pos];
            if c == '\'' {
                let (text, next) = quoted_literal(&chars, pos)?;
                push_literal(&mut tokens, &text);
                pos = next;
                continue;
            }
            if c == 'T' || !c.is_ascii_alphabetic() {
                push_literal(&mut tokens, &c.to_string());
                pos += 1;
                continue;
            }
            let mut end = pos;
            while end < chars.len() && chars[end] == c {
                end += 1;
            }
            tokens.push(letter_token(c, end - pos)?);
            pos = end;
        }
        if tokens.is_empty() {
            return Err(PatternError::MalformedPattern {
                reason: "pattern is empty".to_string(),
            });
        }
        Ok(Self { tokens })
    }

    /// Parse a literal against this pattern.
    ///
    /// The literal's shape is checked first, then component ranges, then
    /// whether the pattern captured enough to build a date.
    pub fn parse(&self, literal: &str) -> Result<ParsedDateTime, PatternError> {
        let components = self.scan(literal)?;
        check_ranges(&components)?;
        build(&components)
    }

    fn scan(&self, literal: &str) -> Result<Components, PatternError> {
        let mismatch = |index: usize| PatternError::StructuralMismatch {
            literal: literal.to_string(),
            index,
        };
        let mut components = Components::default();
        let mut pos = 0;
        for token in &self.tokens {
            let rest = &literal[pos..];
            match token {
                Token::Literal(text) => {
                    if !rest.starts_with(text.as_str()) {
                        return Err(mismatch(pos));
                    }
                    pos += text.len();
                }
                Token::Number { field, min, max } => {
                    let (value, len) = digits(rest, *min, *max).ok_or_else(|| mismatch(pos))?;
                    let slot = match field {
                        Field::Year => &mut components.year,
                        Field::Month => &mut components.month,
                        Field::Day => &mut components.day,
                        Field::Hour => &mut components.hour,
                        Field::ClockHour => &mut components.clock_hour,
                        Field::Minute => &mut components.minute,
                        Field::Second => &mut components.second,
                    };
                    *slot = Some(value);
                    pos += len;
                }
                Token::TwoDigitYear => {
                    let (value, len) = digits(rest, 2, 2).ok_or_else(|| mismatch(pos))?;
                    components.year = Some(2000 + value);
                    pos += len;
                }
                Token::MonthAbbreviation => {
                    let month = rest
                        .get(..3)
                        .and_then(|abbr| {
                            MONTH_ABBREVIATIONS
                                .iter()
                                .position(|m| m.eq_ignore_ascii_case(abbr))
                        })
                        .ok_or_else(|| mismatch(pos))?;
                    components.month = Some(month as u32 + 1);
                    pos += 3;
                }
                Token::Fraction(width) => {
                    let (value, len) = digits(rest, *width, *width).ok_or_else(|| mismatch(pos))?;
                    components.nanosecond = Some(value * 10_u32.pow(9 - *width as u32));
                    pos += len;
                }
                Token::AmPm => {
                    let marker = rest.get(..2).ok_or_else(|| mismatch(pos))?;
                    components.pm = if marker.eq_ignore_ascii_case("AM") {
                        Some(false)
                    } else if marker.eq_ignore_ascii_case("PM") {
                        Some(true)
                    } else {
                        return Err(mismatch(pos));
                    };
                    pos += 2;
                }
                Token::Offset => {
                    let (seconds, len) = offset(rest).ok_or_else(|| mismatch(pos))??;
                    components.offset_seconds = Some(seconds);
                    pos += len;
                }
            }
        }
        if pos != literal.len() {
            return Err(mismatch(pos));
        }
        Ok(components)
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(existing)) = tokens.last_mut() {
        existing.push_str(text);
    } else {
        tokens.push(Token::Literal(text.to_string()));
    }
}

/// Read a quoted literal starting at `start`; returns the text and the index
/// after the closing quote.
fn quoted_literal(chars: &[char], start: usize) -> Result<(String, usize), PatternError> {
    if chars.get(start + 1) == Some(&'\'') {
        return Ok(("'".to_string(), start + 2));
    }
    let mut text = String::new();
    let mut pos = start + 1;
    while pos < chars.len() {
        if chars[pos] == '\'' {
            if chars.get(pos + 1) == Some(&'\'') {
                text.push('\'');
                pos += 2;
                continue;
            }
            return Ok((text, pos + 1));
        }
        text.push(chars[pos]);
        pos += 1;
    }
    Err(PatternError::MalformedPattern {
        reason: format!("unterminated quoted literal at index {start}"),
    })
}

fn letter_token(letter: char, count: usize) -> Result<Token, PatternError> {
    let number = |field, count| match count {
        1 => Ok(Token::Number {
            field,
            min: 1,
            max: 2,
        }),
        2 => Ok(Token::Number {
            field,
            min: 2,
            max: 2,
        }),
        _ => Err(()),
    };
    let token = match letter {
        'y' if count == 4 => Ok(Token::Number {
            field: Field::Year,
            min: 4,
            max: 4,
        }),
        'y' if count == 2 => Ok(Token::TwoDigitYear),
        'M' if count == 3 => Ok(Token::MonthAbbreviation),
        'M' => number(Field::Month, count),
        'd' => number(Field::Day, count),
        'H' => number(Field::Hour, count),
        'h' => number(Field::ClockHour, count),
        'm' => number(Field::Minute, count),
        's' => number(Field::Second, count),
        'S' | 'f' if count <= 9 => Ok(Token::Fraction(count)),
        'a' if count == 1 => Ok(Token::AmPm),
        'Z' if count == 1 => Ok(Token::Offset),
        'X' if count == 1 || count == 3 => Ok(Token::Offset),
        _ => Err(()),
    };
    token.map_err(|()| PatternError::MalformedPattern {
        reason: format!(
            "unsupported pattern letters '{}'",
            letter.to_string().repeat(count)
        ),
    })
}

/// Read between `min` and `max` ASCII digits.
fn digits(text: &str, min: usize, max: usize) -> Option<(u32, usize)> {
    let len = text
        .bytes()
        .take(max)
        .take_while(u8::is_ascii_digit)
        .count();
    if len < min {
        return None;
    }
    text[..len].parse().ok().map(|value| (value, len))
}

/// Read a zone offset. The outer `None` is a shape mismatch; the inner error
/// is an offset outside +-18:00.
fn offset(text: &str) -> Option<Result<(i32, usize), PatternError>> {
    if text.starts_with('Z') || text.starts_with('z') {
        return Some(Ok((0, 1)));
    }
    let sign = match text.bytes().next()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, mut len) = digits(&text[1..], 2, 2)?;
    len += 1;
    let mut minutes = 0;
    let rest = &text[len..];
    if let Some(after_colon) = rest.strip_prefix(':') {
        let (value, used) = digits(after_colon, 2, 2)?;
        minutes = value;
        len += used + 1;
    } else if let Some((value, used)) = digits(rest, 2, 2) {
        minutes = value;
        len += used;
    }
    if hours > 18 {
        return Some(Err(PatternError::ComponentOutOfRange {
            field: "OffsetHours",
            range: "-18 - 18".to_string(),
            value: hours.to_string(),
        }));
    }
    if minutes > 59 {
        return Some(Err(PatternError::ComponentOutOfRange {
            field: "OffsetMinutes",
            range: "0 - 59".to_string(),
            value: minutes.to_string(),
        }));
    }
    let seconds = sign * (hours * 3600 + minutes * 60) as i32;
    Some(Ok((seconds, len)))
}

fn check_ranges(components: &Components) -> Result<(), PatternError> {
    let fields = [
        (Field::Month, components.month),
        (Field::Day, components.day),
        (Field::Hour, components.hour),
        (Field::ClockHour, components.clock_hour),
        (Field::Minute, components.minute),
        (Field::Second, components.second),
    ];
    for (field, value) in fields {
        let Some(value) = value else { continue };
        let (low, high) = field.range();
        if !(low..=high).contains(&value) {
            return Err(out_of_range(field, low, high, value));
        }
    }
    Ok(())
}

fn out_of_range(field: Field, low: u32, high: u32, value: u32) -> PatternError {
    PatternError::ComponentOutOfRange {
        field: field.name(),
        range: format!("{low} - {high}"),
        value: value.to_string(),
    }
}

fn build(components: &Components) -> Result<ParsedDateTime, PatternError> {
    let (Some(year), Some(month), Some(day)) = (components.year, components.month, components.day)
    else {
        return Err(PatternError::Generic(
            "pattern does not define a complete calendar date".to_string(),
        ));
    };
    let Some(date) = NaiveDate::from_ymd_opt(year as i32, month, day) else {
        return Err(out_of_range(
            Field::Day,
            1,
            days_in_month(year as i32, month),
            day,
        ));
    };

    let hour = match (components.hour, components.clock_hour, components.pm) {
        (Some(hour), None, None) => Some(hour),
        (None, Some(clock), Some(pm)) => Some(clock % 12 + if pm { 12 } else { 0 }),
        (None, None, None) => None,
        (Some(_), None, Some(_)) | (None, None, Some(_)) => {
            return Err(PatternError::Generic(
                "AM/PM marker requires a clock hour (h)".to_string(),
            ));
        }
        (None, Some(_), None) => {
            return Err(PatternError::Generic(
                "clock hour (h) requires an AM/PM marker".to_string(),
            ));
        }
        (Some(_), Some(_), _) => {
            return Err(PatternError::Generic(
                "pattern defines both hour of day and clock hour".to_string(),
            ));
        }
    };
    let has_time = hour.is_some()
        || components.minute.is_some()
        || components.second.is_some()
        || components.nanosecond.is_some();
    let time = if has_time {
        let time = NaiveTime::from_hms_nano_opt(
            hour.unwrap_or(0),
            components.minute.unwrap_or(0),
            components.second.unwrap_or(0),
            components.nanosecond.unwrap_or(0),
        )
        .ok_or_else(|| PatternError::Generic("invalid time of day".to_string()))?;
        Some(time)
    } else {
        None
    };
    let offset = match components.offset_seconds {
        Some(seconds) => Some(FixedOffset::east_opt(seconds).ok_or_else(|| {
            PatternError::Generic(format!("offset of {seconds} seconds is not representable"))
        })?),
        None => None,
    };
    Ok(ParsedDateTime { date, time, offset })
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
