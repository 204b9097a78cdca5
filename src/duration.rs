//! ISO 8601 durations and their human-readable rendering.
//!
//! Recipe Keeper stores prep and cook times as ISO 8601 durations
//! (`PT1H30M`), Paprika wants prose (`1 hour 30 minutes`).

use log::warn;
use std::ops::Add;
use std::str::FromStr;
use thiserror::Error;

const SECOND_MS: f64 = 1_000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Delimiter placed between the units of a humanized duration
pub const HUMANIZE_DELIMITER: &str = " ";

/// Unit lengths used when rendering. Years are Julian years and months a
/// twelfth of that, so they differ from the calendar lengths used when
/// a duration is converted to milliseconds.
const HUMANIZE_UNITS: [(&str, f64); 7] = [
    ("year", 365.25 * DAY_MS),
    ("month", 365.25 * DAY_MS / 12.0),
    ("week", 7.0 * DAY_MS),
    ("day", DAY_MS),
    ("hour", HOUR_MS),
    ("minute", MINUTE_MS),
    ("second", SECOND_MS),
];

/// Longest run of digits accepted for a whole or fractional part
const MAX_DIGITS: usize = 20;
/// Seconds carry at most nanosecond precision
const MAX_SECOND_FRACTION_DIGITS: usize = 9;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid ISO 8601 duration '{0}'")]
pub struct DurationParseError(String);

/// A parsed ISO 8601 duration, kept per component.
///
/// Adding two durations adds their components; nothing is normalised
/// until the duration is turned into milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IsoDuration {
    pub years: f64,
    pub months: f64,
    pub weeks: f64,
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl IsoDuration {
    /// Length in milliseconds, counting a year as 365 days and a month as 30.
    pub fn as_millis(&self) -> f64 {
        self.years * 365.0 * DAY_MS
            + self.months * 30.0 * DAY_MS
            + self.weeks * 7.0 * DAY_MS
            + self.days * DAY_MS
            + self.hours * HOUR_MS
            + self.minutes * MINUTE_MS
            + self.seconds * SECOND_MS
    }

    fn negated(self) -> Self {
        IsoDuration {
            years: -self.years,
            months: -self.months,
            weeks: -self.weeks,
            days: -self.days,
            hours: -self.hours,
            minutes: -self.minutes,
            seconds: -self.seconds,
        }
    }
}

impl Add for IsoDuration {
    type Output = IsoDuration;

    fn add(self, rhs: IsoDuration) -> IsoDuration {
        IsoDuration {
            years: self.years + rhs.years,
            months: self.months + rhs.months,
            weeks: self.weeks + rhs.weeks,
            days: self.days + rhs.days,
            hours: self.hours + rhs.hours,
            minutes: self.minutes + rhs.minutes,
            seconds: self.seconds + rhs.seconds,
        }
    }
}

impl FromStr for IsoDuration {
    type Err = DurationParseError;

    /// Accepts `[-]P[nY][nM][nW][nD][T[nH][nM][nS]]`. Every component is
    /// optional, so `P` and `PT` are zero. Components may be negative and
    /// carry a `.` fraction; seconds also accept a `,` fraction.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DurationParseError(s.to_string());

        let (negative, rest) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let rest = rest.strip_prefix('P').ok_or_else(invalid)?;
        let (date, time) = rest.split_once('T').unwrap_or((rest, ""));

        let mut duration = IsoDuration::default();
        parse_section(
            date,
            &mut [
                ('Y', &mut duration.years),
                ('M', &mut duration.months),
                ('W', &mut duration.weeks),
                ('D', &mut duration.days),
            ],
            false,
        )
        .ok_or_else(invalid)?;
        parse_section(
            time,
            &mut [
                ('H', &mut duration.hours),
                ('M', &mut duration.minutes),
                ('S', &mut duration.seconds),
            ],
            true,
        )
        .ok_or_else(invalid)?;

        Ok(if negative { duration.negated() } else { duration })
    }
}

/// Fills `slots` from a run of `<number><designator>` pairs. Designators must
/// appear in slot order, each at most once.
fn parse_section(section: &str, slots: &mut [(char, &mut f64)], time: bool) -> Option<()> {
    let mut rest = section;
    let mut next = 0;

    while !rest.is_empty() {
        let end = rest.find(|c: char| c.is_ascii_alphabetic())?;
        let (number, tail) = rest.split_at(end);
        let designator = tail.chars().next()?;

        let offset = slots[next..].iter().position(|(d, _)| *d == designator)?;
        let slot = next + offset;
        *slots[slot].1 = if time && designator == 'S' {
            parse_number(number, &['.', ','], MAX_SECOND_FRACTION_DIGITS)?
        } else {
            parse_number(number, &['.'], MAX_DIGITS)?
        };

        next = slot + 1;
        rest = &tail[1..];
    }

    Some(())
}

fn parse_number(number: &str, separators: &[char], max_fraction: usize) -> Option<f64> {
    let unsigned = number.strip_prefix('-').unwrap_or(number);
    let (whole, fraction) = match unsigned.split_once(separators) {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let digits = |part: &str, max: usize| {
        (1..=max).contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(whole, MAX_DIGITS) || !fraction.map_or(true, |f| digits(f, max_fraction)) {
        return None;
    }

    number.replace(',', ".").parse().ok()
}

/// Renders a millisecond count as prose, largest unit first, skipping empty
/// units. A sub-second remainder is kept as a fraction of the seconds.
pub fn humanize(millis: f64, delimiter: &str) -> String {
    let mut remaining = millis.abs();
    let mut pieces = Vec::new();

    for (index, (unit, unit_ms)) in HUMANIZE_UNITS.iter().enumerate() {
        let count = if index == HUMANIZE_UNITS.len() - 1 {
            (remaining / unit_ms * 1000.0).round() / 1000.0
        } else {
            (remaining / unit_ms).floor()
        };
        remaining -= count * unit_ms;

        if count > 0.0 {
            pieces.push(format_unit(count, unit));
        }
    }

    if pieces.is_empty() {
        return format_unit(0.0, "second");
    }
    pieces.join(delimiter)
}

fn format_unit(count: f64, unit: &str) -> String {
    let number = if count.fract() == 0.0 {
        format!("{count:.0}")
    } else {
        format!("{count:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    };
    let plural = if count == 1.0 { "" } else { "s" };
    format!("{number} {unit}{plural}")
}

/// Paprika's three time fields. A field is `None` unless its duration is
/// strictly positive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookingTimes {
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub total_time: Option<String>,
}

/// Derives the prep, cook and total times from the two ISO 8601 strings of
/// a recipe. A missing or unparseable input leaves its own field and the
/// total empty.
pub fn parse_times(prep: Option<&str>, cook: Option<&str>) -> CookingTimes {
    let prep = prep.and_then(parse_logged);
    let cook = cook.and_then(parse_logged);
    let total = match (prep, cook) {
        (Some(prep), Some(cook)) => Some(prep + cook),
        _ => None,
    };

    CookingTimes {
        prep_time: humanize_positive(prep),
        cook_time: humanize_positive(cook),
        total_time: humanize_positive(total),
    }
}

fn parse_logged(raw: &str) -> Option<IsoDuration> {
    match raw.parse() {
        Ok(duration) => Some(duration),
        Err(e) => {
            warn!("Ignoring time: {}", e);
            None
        }
    }
}

fn humanize_positive(duration: Option<IsoDuration>) -> Option<String> {
    duration
        .map(|d| d.as_millis())
        .filter(|millis| *millis > 0.0)
        .map(|millis| humanize(millis, HUMANIZE_DELIMITER))
}
