//! Timezone arithmetic: conversions between civil (date, minute-of-day)
//! representations and absolute instants, parameterized by IANA zones.
//!
//! All functions are pure. Zones are parsed once at the boundary with
//! [`parse_time_zone`]; an unknown identifier is a data-integrity error and
//! fails loudly rather than silently mis-resolving times.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::scheduling::SlotError;

/// Guard on `list_dates_between`: viewer/meeting-zone offset differences can
/// spill over at most ~1 civil day, so this cap is a safety net, not a limit
/// callers should ever reach.
const MAX_SPAN_DATES: usize = 8;

/// Cap on `list_dates_from_start`.
const MAX_LOOKAHEAD_DATES: usize = 62;

pub fn parse_time_zone(name: &str) -> Result<Tz, SlotError> {
    name.parse::<Tz>()
        .map_err(|_| SlotError::InvalidTimeZone(name.to_string()))
}

/// Convert a civil (date, minutes-since-midnight) pair interpreted in `tz`
/// into an absolute instant.
///
/// Handles DST transitions by iterate-once offset refinement: guess by
/// applying the offset in effect at the naive-UTC reading of the civil time,
/// then re-derive the offset at the guessed instant and re-apply it if it
/// changed. A naive single-offset conversion lands one hour off when the
/// guess and the answer sit on different sides of a transition.
///
/// `minute_of_day` may be any value in `0..=1440` (1440 is the next
/// midnight); padded blackout conversion relies on the clamped endpoints.
pub fn civil_date_to_utc(date: NaiveDate, minute_of_day: i32, tz: Tz) -> DateTime<Utc> {
    let civil = date.and_time(NaiveTime::MIN) + Duration::minutes(minute_of_day as i64);

    let first_offset = tz.offset_from_utc_datetime(&civil).fix().local_minus_utc();
    let mut result = civil - Duration::seconds(first_offset as i64);

    let refined_offset = tz.offset_from_utc_datetime(&result).fix().local_minus_utc();
    if refined_offset != first_offset {
        result = civil - Duration::seconds(refined_offset as i64);
    }

    Utc.from_utc_datetime(&result)
}

/// The civil date of `instant` as seen in `tz`.
pub fn civil_date_in_zone(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Render `instant` as an "h:mm AM/PM" label in `tz`.
pub fn civil_time_label_in_zone(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%-I:%M %p").to_string()
}

/// Minutes since midnight of `instant` in `tz`, in `[0, 1440)`.
pub fn minutes_since_midnight_in_zone(instant: DateTime<Utc>, tz: Tz) -> i32 {
    let local = instant.with_timezone(&tz);
    (local.hour() * 60 + local.minute()) as i32
}

/// Weekday index of a civil date in `tz`, 0 = Sunday. Samples the middle of
/// the day (12:00) so DST transitions at the edges cannot shift the answer.
pub fn weekday_index_for_date(date: NaiveDate, tz: Tz) -> u32 {
    let noon = civil_date_to_utc(date, 720, tz);
    noon.with_timezone(&tz).weekday().num_days_from_sunday()
}

pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(n)).unwrap_or(date)
}

/// All civil dates from `start` to `end` inclusive, deduplicated, iteration
/// guarded to [`MAX_SPAN_DATES`]. Callers only ever span a single civil-day
/// crossing, so the guard never truncates legitimate input.
pub fn list_dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;

    for _ in 0..MAX_SPAN_DATES {
        if dates.last() != Some(&current) {
            dates.push(current);
        }
        if current >= end {
            break;
        }
        current = add_days(current, 1);
    }

    dates
}

/// `count` consecutive civil dates starting at `date`, capped at
/// [`MAX_LOOKAHEAD_DATES`].
pub fn list_dates_from_start(date: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (0..count.min(MAX_LOOKAHEAD_DATES))
        .map(|i| add_days(date, i as i64))
        .collect()
}
