use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::warn;
use crate::domain::models::operating_hours::{BookingRules, DayHours, OpenPeriod, OperatingHours};
use crate::domain::services::overlap::TimeRange;
use crate::error::AppError;

pub const MINUTES_PER_DAY: u32 = 1440;

/// Fallback window for venues without any operating-hours configuration.
pub const DEFAULT_OPEN_MINUTE: u32 = 6 * 60;
pub const DEFAULT_CLOSE_MINUTE: u32 = 23 * 60;

/// Half-open span of minutes after local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinuteSpan {
    pub start: u32,
    pub end: u32,
}

impl MinuteSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, other: MinuteSpan) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursSource {
    Default,
    Regular,
    Seasonal,
    Special,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OperatingWindow {
    Open {
        periods: Vec<MinuteSpan>,
        source: HoursSource,
        label: Option<String>,
    },
    Closed {
        reason: String,
        source: HoursSource,
    },
}

impl OperatingWindow {
    pub fn closed(reason: impl Into<String>, source: HoursSource) -> Self {
        OperatingWindow::Closed { reason: reason.into(), source }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, OperatingWindow::Open { .. })
    }

    pub fn periods(&self) -> &[MinuteSpan] {
        match self {
            OperatingWindow::Open { periods, .. } => periods,
            OperatingWindow::Closed { .. } => &[],
        }
    }

    pub fn source(&self) -> HoursSource {
        match self {
            OperatingWindow::Open { source, .. } | OperatingWindow::Closed { source, .. } => *source,
        }
    }

    /// Closure reason, or the label of the seasonal/special override that opened the day.
    pub fn reason(&self) -> Option<&str> {
        match self {
            OperatingWindow::Open { label, .. } => label.as_deref(),
            OperatingWindow::Closed { reason, .. } => Some(reason),
        }
    }

    pub fn longest_period(&self) -> u32 {
        self.periods().iter().map(MinuteSpan::len).max().unwrap_or(0)
    }

    /// True when `span` fits entirely inside a single open period.
    pub fn contains(&self, span: MinuteSpan) -> bool {
        self.periods().iter().any(|p| p.contains(span))
    }
}

/// Parses "HH:MM" literally. "24:00" is accepted and denotes end of day.
pub fn parse_clock(value: &str) -> Option<u32> {
    let (h, m) = value.trim().split_once(':')?;
    let hour: u32 = h.parse().ok()?;
    let minute: u32 = m.parse().ok()?;

    match (hour, minute) {
        (24, 0) => Some(MINUTES_PER_DAY),
        (0..=23, 0..=59) => Some(hour * 60 + minute),
        _ => None,
    }
}

/// Closing time of an operating period. "23:59" is the usual way to write
/// "open until midnight" in hours documents.
fn parse_closing_clock(value: &str) -> Option<u32> {
    parse_clock(value).map(|m| if m == MINUTES_PER_DAY - 1 { MINUTES_PER_DAY } else { m })
}

pub fn format_clock(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn to_spans(periods: &[OpenPeriod]) -> Vec<MinuteSpan> {
    let mut spans: Vec<MinuteSpan> = periods
        .iter()
        .filter_map(|p| match (parse_clock(&p.open), parse_closing_clock(&p.close)) {
            (Some(open), Some(close)) if open < close => Some(MinuteSpan::new(open, close)),
            _ => {
                warn!("Ignoring malformed operating period {}-{}", p.open, p.close);
                None
            }
        })
        .collect();

    spans.sort_by_key(|s| s.start);
    spans
}

fn weekday_window(day: Option<&DayHours>, weekday: Weekday, source: HoursSource, label: Option<String>) -> OperatingWindow {
    let closed_reason = || format!("Closed on {}", day_name(weekday));

    let Some(day) = day else {
        return OperatingWindow::closed(closed_reason(), source);
    };
    if day.closed {
        return OperatingWindow::closed(closed_reason(), source);
    }

    let periods = to_spans(&day.periods);
    if periods.is_empty() {
        return OperatingWindow::closed(closed_reason(), source);
    }

    OperatingWindow::Open { periods, source, label }
}

pub fn default_window() -> OperatingWindow {
    OperatingWindow::Open {
        periods: vec![MinuteSpan::new(DEFAULT_OPEN_MINUTE, DEFAULT_CLOSE_MINUTE)],
        source: HoursSource::Default,
        label: None,
    }
}

/// Resolves the open periods of one calendar date.
///
/// Priority: special-date override, then a seasonal override covering the
/// date, then the regular weekly schedule. A venue with no configuration (or
/// an empty weekly schedule and no override for the date) gets the default
/// 06:00-23:00 window.
pub fn resolve_operating_window(hours: Option<&OperatingHours>, date: NaiveDate) -> OperatingWindow {
    let Some(hours) = hours else {
        return default_window();
    };

    if let Some(special) = hours.special_for(date) {
        let reason = special.reason.clone().filter(|r| !r.trim().is_empty());
        if special.closed {
            return OperatingWindow::closed(
                reason.unwrap_or_else(|| "Closed for special date".to_string()),
                HoursSource::Special,
            );
        }

        let periods = to_spans(&special.periods);
        if periods.is_empty() {
            return OperatingWindow::closed(
                reason.unwrap_or_else(|| "No opening hours on special date".to_string()),
                HoursSource::Special,
            );
        }
        return OperatingWindow::Open { periods, source: HoursSource::Special, label: reason };
    }

    let weekday = date.weekday();

    if let Some(season) = hours.season_for(date) {
        let label = Some(season.name.clone()).filter(|n| !n.trim().is_empty());
        return weekday_window(season.schedule.for_weekday(weekday), weekday, HoursSource::Seasonal, label);
    }

    if hours.regular.is_empty() {
        return default_window();
    }

    weekday_window(hours.regular.for_weekday(weekday), weekday, HoursSource::Regular, None)
}

/// Checks a requested duration (in minutes) against booking rules, or, when
/// the venue defines none, against the longest open period of the day.
pub fn validate_duration(rules: Option<&BookingRules>, window: &OperatingWindow, minutes: u32) -> Result<(), AppError> {
    let rules = rules.filter(|r| r.min_duration_hours.is_some() || r.max_duration_hours.is_some());

    if let Some(rules) = rules {
        if let Some(min) = rules.min_duration_hours
            && (minutes as i64) < (min as i64) * 60 {
            return Err(AppError::Validation(format!("Minimum booking duration is {} hours", min)));
        }
        if let Some(max) = rules.max_duration_hours
            && (minutes as i64) > (max as i64) * 60 {
            return Err(AppError::Validation(format!("Maximum booking duration is {} hours", max)));
        }
        return Ok(());
    }

    let longest = window.longest_period();
    if window.is_open() && minutes > longest {
        return Err(AppError::Validation(format!(
            "Requested duration of {} exceeds the longest operating period ({})",
            format_clock(minutes),
            format_clock(longest)
        )));
    }
    Ok(())
}

fn local_datetime(date: NaiveDate, minutes: u32) -> Option<NaiveDateTime> {
    Some(date.and_hms_opt(0, 0, 0)? + Duration::minutes(minutes as i64))
}

fn utc_candidates(tz: Tz, local: NaiveDateTime) -> Vec<DateTime<Utc>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => vec![dt.with_timezone(&Utc)],
        LocalResult::Ambiguous(a, b) => vec![a.with_timezone(&Utc), b.with_timezone(&Utc)],
        LocalResult::None => Vec::new(),
    }
}

/// UTC instant of `minutes` after local midnight of `date`. `None` inside a DST gap.
pub fn local_instant(tz: Tz, date: NaiveDate, minutes: u32) -> Option<DateTime<Utc>> {
    utc_candidates(tz, local_datetime(date, minutes)?).into_iter().next()
}

/// UTC range of a local span. Both ends must exist on the wall clock and the
/// range must last exactly the span's length, so a span that crosses a DST
/// change resolves to the matching offsets or to `None`.
pub fn local_range(tz: Tz, date: NaiveDate, span: MinuteSpan) -> Option<TimeRange> {
    let length = Duration::minutes(span.len() as i64);
    let starts = utc_candidates(tz, local_datetime(date, span.start)?);
    let ends = utc_candidates(tz, local_datetime(date, span.end)?);

    starts
        .iter()
        .flat_map(|start| ends.iter().map(move |end| TimeRange::new(*start, *end)))
        .find(|range| range.end - range.start == length)
}

/// First instant at or after local `at` that exists in `tz`.
fn first_instant_from(tz: Tz, at: NaiveDateTime) -> DateTime<Utc> {
    let mut local = at;
    // Real gaps are at most a couple of hours.
    for _ in 0..MINUTES_PER_DAY {
        if let Some(instant) = utc_candidates(tz, local).into_iter().next() {
            return instant;
        }
        local += Duration::minutes(1);
    }
    Utc.from_utc_datetime(&at)
}

/// UTC bounds of the whole local calendar day. A midnight skipped by a DST
/// change resolves to the first wall-clock instant after it.
pub fn local_day_bounds(tz: Tz, date: NaiveDate) -> TimeRange {
    let midnight = date.and_time(NaiveTime::MIN);
    let next_midnight = midnight + Duration::days(1);
    TimeRange::new(first_instant_from(tz, midnight), first_instant_from(tz, next_midnight))
}
