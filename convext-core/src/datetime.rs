//! DateTime and DateTimeOffset types for Convext
//!
//! Nanosecond-precision instants on the proleptic Gregorian calendar,
//! stored as `i128` nanoseconds since the Unix epoch.
//!
//! Design principles:
//! - No external datetime crates (keeps convext-core minimal)
//! - Range is 0001-01-01T00:00:00 through 9999-12-31T23:59:59.999999999
//! - Plain `DateTime` is always UTC; `DateTimeOffset` pairs a UTC instant
//!   with a fixed offset
//! - Never panics - constructors return Results

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// ============================================================================
// Constants
// ============================================================================

pub const NANOS_PER_MILLI: i128 = 1_000_000;
pub const NANOS_PER_SECOND: i128 = 1_000_000_000;
pub const NANOS_PER_MINUTE: i128 = 60 * NANOS_PER_SECOND;
pub const NANOS_PER_HOUR: i128 = 60 * NANOS_PER_MINUTE;
pub const NANOS_PER_DAY: i128 = 24 * NANOS_PER_HOUR;

/// Largest accepted UTC offset, in seconds (±14:00)
pub const MAX_OFFSET_SECS: i32 = 14 * 3600;

/// Days in each month (non-leap year)
const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Days from 0000-03-01 to 1970-01-01
const UNIX_EPOCH_DAYS: i64 = 719_468;

const MIN_YEAR: i32 = 1;
const MAX_YEAR: i32 = 9999;

const MIN_NANOS: i128 = days_from_civil(MIN_YEAR, 1, 1) as i128 * NANOS_PER_DAY;
const MAX_NANOS: i128 = (days_from_civil(MAX_YEAR, 12, 31) as i128 + 1) * NANOS_PER_DAY - 1;

// ============================================================================
// DateTime
// ============================================================================

/// A plain instant, interpreted as UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DateTime {
    /// Nanoseconds since Unix epoch (negative for pre-1970 instants)
    nanos: i128,
}

impl DateTime {
    /// 1970-01-01T00:00:00Z
    pub const UNIX_EPOCH: DateTime = DateTime { nanos: 0 };

    /// 0001-01-01T00:00:00Z
    pub const MIN: DateTime = DateTime { nanos: MIN_NANOS };

    /// 9999-12-31T23:59:59.999999999Z
    pub const MAX: DateTime = DateTime { nanos: MAX_NANOS };

    // ========== Construction ==========

    /// Create from nanoseconds since Unix epoch
    pub fn from_nanos(nanos: i128) -> Result<Self, DateTimeError> {
        if !(MIN_NANOS..=MAX_NANOS).contains(&nanos) {
            return Err(DateTimeError::OutOfRange);
        }
        Ok(Self { nanos })
    }

    /// Create from milliseconds since Unix epoch
    pub fn from_unix_millis(millis: i64) -> Result<Self, DateTimeError> {
        Self::from_nanos(millis as i128 * NANOS_PER_MILLI)
    }

    /// Create a date (time = 00:00:00)
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateTimeError> {
        Self::from_ymd_hms_nano(year, month, day, 0, 0, 0, 0)
    }

    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<Self, DateTimeError> {
        Self::from_ymd_hms_nano(year, month, day, hour, minute, second, 0)
    }

    pub fn from_ymd_hms_milli(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        milli: u32,
    ) -> Result<Self, DateTimeError> {
        if milli >= 1_000 {
            return Err(DateTimeError::InvalidNano(milli.saturating_mul(1_000_000)));
        }
        Self::from_ymd_hms_nano(year, month, day, hour, minute, second, milli * 1_000_000)
    }

    /// Create from components with nanoseconds
    pub fn from_ymd_hms_nano(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        nano: u32,
    ) -> Result<Self, DateTimeError> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(DateTimeError::InvalidYear(year));
        }
        if !(1..=12).contains(&month) {
            return Err(DateTimeError::InvalidMonth(month));
        }
        if day < 1 || day > days_in_month(year, month) {
            return Err(DateTimeError::InvalidDay(day, month, year));
        }
        if hour > 23 {
            return Err(DateTimeError::InvalidHour(hour));
        }
        if minute > 59 {
            return Err(DateTimeError::InvalidMinute(minute));
        }
        if second > 59 {
            return Err(DateTimeError::InvalidSecond(second));
        }
        if nano >= 1_000_000_000 {
            return Err(DateTimeError::InvalidNano(nano));
        }

        let day_nanos = days_from_civil(year, month, day) as i128 * NANOS_PER_DAY;
        let time_nanos = hour as i128 * NANOS_PER_HOUR
            + minute as i128 * NANOS_PER_MINUTE
            + second as i128 * NANOS_PER_SECOND
            + nano as i128;

        Self::from_nanos(day_nanos + time_nanos)
    }

    // ========== Accessors ==========

    /// Nanoseconds since Unix epoch
    pub fn as_nanos(&self) -> i128 {
        self.nanos
    }

    /// Milliseconds since Unix epoch, truncated toward zero
    pub fn unix_millis(&self) -> i64 {
        // |MAX_NANOS / NANOS_PER_MILLI| fits comfortably in i64
        (self.nanos / NANOS_PER_MILLI) as i64
    }

    pub fn year(&self) -> i32 {
        self.to_ymd().0
    }

    pub fn month(&self) -> u32 {
        self.to_ymd().1
    }

    pub fn day(&self) -> u32 {
        self.to_ymd().2
    }

    pub fn hour(&self) -> u32 {
        (self.nanos.rem_euclid(NANOS_PER_DAY) / NANOS_PER_HOUR) as u32
    }

    pub fn minute(&self) -> u32 {
        (self.nanos.rem_euclid(NANOS_PER_HOUR) / NANOS_PER_MINUTE) as u32
    }

    pub fn second(&self) -> u32 {
        (self.nanos.rem_euclid(NANOS_PER_MINUTE) / NANOS_PER_SECOND) as u32
    }

    /// Nanosecond component (0-999_999_999)
    pub fn nanosecond(&self) -> u32 {
        self.nanos.rem_euclid(NANOS_PER_SECOND) as u32
    }

    /// Millisecond component (0-999)
    pub fn millisecond(&self) -> u32 {
        self.nanosecond() / 1_000_000
    }

    /// Decompose into year, month, day
    pub fn to_ymd(&self) -> (i32, u32, u32) {
        civil_from_days(self.nanos.div_euclid(NANOS_PER_DAY) as i64)
    }

    // ========== Arithmetic ==========

    /// Add milliseconds, failing if the result leaves the supported range
    pub fn add_millis(&self, millis: i64) -> Result<Self, DateTimeError> {
        Self::from_nanos(self.nanos + millis as i128 * NANOS_PER_MILLI)
    }

    fn shifted(&self, secs: i32) -> Result<Self, DateTimeError> {
        Self::from_nanos(self.nanos + secs as i128 * NANOS_PER_SECOND)
    }

    // ========== Formatting ==========

    /// Format as ISO 8601 with a `Z` designator
    pub fn to_iso_string(&self) -> String {
        format!("{}Z", self.format_local())
    }

    fn format_local(&self) -> String {
        let (year, month, day) = self.to_ymd();
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
            year,
            month,
            day,
            self.hour(),
            self.minute(),
            self.second(),
            format_fraction(self.nanosecond())
        )
    }

    /// Parse an ISO 8601 string. An explicit offset is normalized to UTC;
    /// without one the value is taken as UTC.
    pub fn parse(s: &str) -> Result<Self, DateTimeError> {
        let stamp = parse_stamp(s)?;
        match stamp.offset_secs {
            Some(offset) => stamp.local.shifted(-offset),
            None => Ok(stamp.local),
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

// ============================================================================
// DateTimeOffset
// ============================================================================

/// A UTC instant paired with a fixed UTC offset
///
/// Equality compares both the instant and the offset; use
/// [`DateTimeOffset::same_instant`] to compare instants only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DateTimeOffset {
    utc: DateTime,
    offset_secs: i32,
}

impl DateTimeOffset {
    /// Create from local wall-clock time and its offset from UTC
    pub fn new(local: DateTime, offset_secs: i32) -> Result<Self, DateTimeError> {
        validate_offset(offset_secs)?;
        let utc = local.shifted(-offset_secs)?;
        Ok(Self { utc, offset_secs })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_ymd_hms_milli(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        milli: u32,
        offset_secs: i32,
    ) -> Result<Self, DateTimeError> {
        let local = DateTime::from_ymd_hms_milli(year, month, day, hour, minute, second, milli)?;
        Self::new(local, offset_secs)
    }

    /// Wrap a UTC instant with a zero offset
    pub fn from_utc(utc: DateTime) -> Self {
        Self { utc, offset_secs: 0 }
    }

    pub fn utc(&self) -> DateTime {
        self.utc
    }

    /// Wall-clock time at the stored offset
    pub fn local(&self) -> DateTime {
        // Both endpoints were range-checked at construction
        DateTime { nanos: self.utc.nanos + self.offset_secs as i128 * NANOS_PER_SECOND }
    }

    pub fn offset_secs(&self) -> i32 {
        self.offset_secs
    }

    /// Milliseconds since Unix epoch of the UTC instant, truncated toward zero
    pub fn unix_millis(&self) -> i64 {
        self.utc.unix_millis()
    }

    pub fn same_instant(&self, other: &DateTimeOffset) -> bool {
        self.utc == other.utc
    }

    /// Format as ISO 8601 with a `±HH:MM` offset
    pub fn to_iso_string(&self) -> String {
        let (sign, abs) = if self.offset_secs < 0 {
            ('-', -self.offset_secs)
        } else {
            ('+', self.offset_secs)
        };
        format!(
            "{}{}{:02}:{:02}",
            self.local().format_local(),
            sign,
            abs / 3600,
            (abs % 3600) / 60
        )
    }

    /// Parse an ISO 8601 string; a missing offset means `+00:00`
    pub fn parse(s: &str) -> Result<Self, DateTimeError> {
        let stamp = parse_stamp(s)?;
        Self::new(stamp.local, stamp.offset_secs.unwrap_or(0))
    }
}

impl fmt::Display for DateTimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_iso_string())
    }
}

fn validate_offset(offset_secs: i32) -> Result<(), DateTimeError> {
    if offset_secs.abs() > MAX_OFFSET_SECS || offset_secs % 60 != 0 {
        return Err(DateTimeError::InvalidOffset(offset_secs));
    }
    Ok(())
}

fn format_fraction(nanos: u32) -> String {
    if nanos == 0 {
        String::new()
    } else if nanos % 1_000_000 == 0 {
        format!(".{:03}", nanos / 1_000_000)
    } else {
        format!(".{:09}", nanos)
    }
}

// ============================================================================
// DateTimeError
// ============================================================================

/// Errors that can occur with datetime operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateTimeError {
    #[error("Invalid year: {0} (must be 1-9999)")]
    InvalidYear(i32),

    #[error("Invalid month: {0} (must be 1-12)")]
    InvalidMonth(u32),

    #[error("Invalid day: {0} for {1}/{2}")]
    InvalidDay(u32, u32, i32),

    #[error("Invalid hour: {0} (must be 0-23)")]
    InvalidHour(u32),

    #[error("Invalid minute: {0} (must be 0-59)")]
    InvalidMinute(u32),

    #[error("Invalid second: {0} (must be 0-59)")]
    InvalidSecond(u32),

    #[error("Invalid nanosecond: {0}")]
    InvalidNano(u32),

    #[error("Invalid UTC offset: {0} seconds (must be whole minutes within ±14:00)")]
    InvalidOffset(i32),

    #[error("DateTime out of range (0001-01-01 through 9999-12-31)")]
    OutOfRange,

    #[error("Parse error: {0}")]
    Parse(String),
}

// ============================================================================
// Calendar Utilities (Gregorian proleptic)
// ============================================================================

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => DAYS_IN_MONTH[(month - 1) as usize],
        _ => 0,
    }
}

/// Convert civil date to days since Unix epoch
/// Algorithm from Howard Hinnant: http://howardhinnant.github.io/date_algorithms.html
const fn days_from_civil(year: i32, month: u32, day: u32) -> i64 {
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = if y >= 0 { y } else { y - 399 } / 400;
    let yoe = y - era * 400; // [0, 399]
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1; // [0, 365]
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy; // [0, 146096]
    era * 146097 + doe - UNIX_EPOCH_DAYS
}

/// Convert days since Unix epoch to civil date
fn civil_from_days(days: i64) -> (i32, u32, u32) {
    let z = days + UNIX_EPOCH_DAYS;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u32; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // [0, 399]
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
    let year = if m <= 2 { y + 1 } else { y };
    (year as i32, m, d)
}

// ============================================================================
// Parsing
// ============================================================================

struct ParsedStamp {
    local: DateTime,
    offset_secs: Option<i32>,
}

/// Supported formats:
/// - `YYYY-MM-DD`
/// - `YYYY-MM-DDTHH:MM[:SS[.fffffffff]]` with `T`, `t` or a space separator
/// - either of the above followed by `Z` or `±HH[:MM]`
fn parse_stamp(s: &str) -> Result<ParsedStamp, DateTimeError> {
    let s = s.trim();
    let (date_part, time_part) = match s.find(['T', 't', ' ']) {
        Some(pos) => (&s[..pos], Some(&s[pos + 1..])),
        None => (s, None),
    };

    let (year, month, day) = parse_date(date_part)?;
    let Some(time_part) = time_part else {
        return Ok(ParsedStamp {
            local: DateTime::from_ymd(year, month, day)?,
            offset_secs: None,
        });
    };

    let (clock, offset_secs) = split_offset(time_part)?;
    let (hour, minute, second, nano) = parse_clock(clock)?;
    Ok(ParsedStamp {
        local: DateTime::from_ymd_hms_nano(year, month, day, hour, minute, second, nano)?,
        offset_secs,
    })
}

fn parse_date(s: &str) -> Result<(i32, u32, u32), DateTimeError> {
    let parts: Vec<&str> = s.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 {
        return Err(DateTimeError::Parse(format!("Expected YYYY-MM-DD, got '{}'", s)));
    }
    Ok((
        parse_digits(parts[0], "year")?,
        parse_digits(parts[1], "month")?,
        parse_digits(parts[2], "day")?,
    ))
}

fn split_offset(time: &str) -> Result<(&str, Option<i32>), DateTimeError> {
    if let Some(clock) = time.strip_suffix(['Z', 'z']) {
        return Ok((clock, Some(0)));
    }
    match time.rfind(['+', '-']) {
        Some(pos) if pos > 0 => {
            let magnitude = parse_offset(&time[pos + 1..])?;
            let offset = if time[pos..].starts_with('-') { -magnitude } else { magnitude };
            validate_offset(offset)?;
            Ok((&time[..pos], Some(offset)))
        }
        Some(_) => Err(DateTimeError::Parse(format!("Invalid time '{}'", time))),
        None => Ok((time, None)),
    }
}

fn parse_offset(s: &str) -> Result<i32, DateTimeError> {
    if !s.is_ascii() {
        return Err(DateTimeError::Parse(format!("Invalid offset '{}'", s)));
    }
    let (hours, minutes) = match s.split_once(':') {
        Some((h, m)) => (h, m),
        None if s.len() == 4 => s.split_at(2),
        None => (s, "0"),
    };
    if hours.len() > 2 || minutes.len() > 2 {
        return Err(DateTimeError::Parse(format!("Invalid offset '{}'", s)));
    }
    let hours: i32 = parse_digits(hours, "offset hours")?;
    let minutes: i32 = parse_digits(minutes, "offset minutes")?;
    if minutes > 59 {
        return Err(DateTimeError::Parse(format!("Invalid offset minutes: {}", minutes)));
    }
    // At most 99:59, well inside i32
    Ok(hours * 3600 + minutes * 60)
}

fn parse_clock(s: &str) -> Result<(u32, u32, u32, u32), DateTimeError> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(DateTimeError::Parse(format!("Expected HH:MM[:SS], got '{}'", s)));
    }
    let hour = parse_digits(parts[0], "hour")?;
    let minute = parse_digits(parts[1], "minute")?;
    let (second, nano) = match parts.get(2) {
        Some(sec) => match sec.split_once('.') {
            Some((whole, frac)) => (parse_digits(whole, "second")?, parse_fraction(frac)?),
            None => (parse_digits(sec, "second")?, 0),
        },
        None => (0, 0),
    };
    Ok((hour, minute, second, nano))
}

/// Pad or truncate to 9 digits (nanoseconds)
fn parse_fraction(s: &str) -> Result<u32, DateTimeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateTimeError::Parse(format!("Invalid fractional seconds '{}'", s)));
    }
    let digits = if s.len() > 9 { &s[..9] } else { s };
    parse_digits(&format!("{:0<9}", digits), "fractional seconds")
}

fn parse_digits<T: std::str::FromStr>(s: &str, what: &str) -> Result<T, DateTimeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateTimeError::Parse(format!("Invalid {} '{}'", what, s)));
    }
    s.parse()
        .map_err(|_| DateTimeError::Parse(format!("Invalid {} '{}'", what, s)))
}

// ============================================================================
// Tests
// ============================================================================
