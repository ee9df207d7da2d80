//! The slot generator: turns a meeting type's rules, recurring windows,
//! blackouts and bookings into the ordered list of offerable slots for one
//! viewer-day, with visibility shaping applied.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::db::models::{
    availability_mode, booking_status, Blackout, Booking, MeetingType, ScheduleSettings,
    WeeklyAvailability, WeeklyBlackout,
};
use crate::scheduling::pattern::pattern_hash;
use crate::scheduling::timezone::{
    civil_date_in_zone, civil_date_to_utc, civil_time_label_in_zone, list_dates_between,
    minutes_since_midnight_in_zone, parse_time_zone, weekday_index_for_date,
};
use crate::scheduling::SlotError;

/// Candidate slot starts fall on a 15-minute grid within each availability
/// window.
const SLOT_STEP_MINUTES: i64 = 15;

/// Overnight suppression bounds, minutes of the viewer's civil day: slots
/// before 07:00 or at/after 21:00 viewer-local are dropped when the meeting
/// type asks for it.
const OVERNIGHT_MORNING_MINUTE: i32 = 7 * 60;
const OVERNIGHT_EVENING_MINUTE: i32 = 21 * 60;

/// A computed bookable slot. Not persisted; serialized directly as the
/// bookable-times payload of the public scheduling page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// "h:mm AM/PM" in the viewer's timezone.
    pub viewer_label: String,
    /// "h:mm AM/PM" in the meeting's effective timezone.
    pub meeting_label: String,
    /// Present only when the slot is shown but marked unavailable by
    /// shaping rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_busy: Option<bool>,
}

/// Resolve the timezone a meeting type runs in on a given civil date.
///
/// Schedule settings' primary zone overrides the meeting type's default;
/// within the travel window (inclusive civil dates) the travel zone replaces
/// both. Recomputed per date: a travel window can put the same meeting type
/// in two zones across a multi-day lookahead.
pub fn effective_time_zone(
    meeting_type: &MeetingType,
    civil_date: NaiveDate,
    settings: Option<&ScheduleSettings>,
) -> Result<Tz, SlotError> {
    if let Some(settings) = settings {
        if settings.travel_mode_enabled {
            if let (Some(travel_zone), Some(start), Some(end)) = (
                settings.travel_time_zone.as_deref(),
                settings.travel_start_date,
                settings.travel_end_date,
            ) {
                if civil_date >= start && civil_date <= end {
                    return parse_time_zone(travel_zone);
                }
            }
        }
    }

    let base = settings
        .and_then(|s| s.primary_time_zone.as_deref())
        .unwrap_or(&meeting_type.time_zone);

    parse_time_zone(base)
}

/// Compute the ordered, shaped list of offerable slots for one viewer-day.
///
/// `now` is injected rather than read from the system clock so callers (and
/// tests) control it; the service layer passes `Utc::now()`. Malformed or
/// missing availability yields an empty list, never an error — absence of
/// data means "closed".
#[allow(clippy::too_many_arguments)]
pub fn compute_slots(
    meeting_type: &MeetingType,
    weekly_availability: &[WeeklyAvailability],
    weekly_blackouts: &[WeeklyBlackout],
    blackouts: &[Blackout],
    bookings: &[Booking],
    date: NaiveDate,
    viewer_time_zone: &str,
    settings: Option<&ScheduleSettings>,
    now: DateTime<Utc>,
) -> Result<Vec<Slot>, SlotError> {
    let viewer_tz = parse_time_zone(viewer_time_zone)?;
    let viewer_start = civil_date_to_utc(date, 0, viewer_tz);
    let viewer_end = civil_date_to_utc(date, 1440, viewer_tz);

    // The viewer's day can straddle two meeting-side civil dates when the
    // zones cross midnight differently; enumerate every date touched.
    let boundary_tz = effective_time_zone(meeting_type, date, settings)?;
    let first_date = civil_date_in_zone(viewer_start, boundary_tz);
    let last_date = civil_date_in_zone(viewer_end - Duration::milliseconds(1), boundary_tz);
    let candidate_dates = list_dates_between(first_date, last_date);

    let duration = meeting_type.duration_minutes;
    let buffer_before = meeting_type.buffer_before_minutes;
    let buffer_after = meeting_type.buffer_after_minutes;

    let earliest_start = now + Duration::minutes(meeting_type.min_notice_minutes);
    let horizon_end = now + Duration::days(meeting_type.max_horizon_days);

    // Active bookings block slots with their own symmetric buffer padding;
    // canceled rows never block anything.
    let booking_blocks: Vec<(DateTime<Utc>, DateTime<Utc>)> = bookings
        .iter()
        .filter(|b| b.status != booking_status::CANCELED)
        .map(|b| {
            (
                b.start_time - Duration::minutes(buffer_before),
                b.end_time + Duration::minutes(buffer_after),
            )
        })
        .collect();

    let mut slots: Vec<Slot> = Vec::new();

    for &meeting_date in &candidate_dates {
        let tz = effective_time_zone(meeting_type, meeting_date, settings)?;
        let weekday = weekday_index_for_date(meeting_date, tz) as i64;

        // No availability defined for the weekday means closed, not open.
        let day_windows: Vec<&WeeklyAvailability> = weekly_availability
            .iter()
            .filter(|w| w.day_of_week == weekday)
            .collect();
        if day_windows.is_empty() {
            continue;
        }

        // Recurring blackouts for this weekday: pad the minute range outward
        // by the buffers, clamp to the civil day, then convert.
        let recurring_blocks: Vec<(DateTime<Utc>, DateTime<Utc>)> = weekly_blackouts
            .iter()
            .filter(|w| w.day_of_week == weekday)
            .map(|w| {
                let padded_start = (w.start_minute - buffer_before).clamp(0, 1440);
                let padded_end = (w.end_minute + buffer_after).clamp(0, 1440);
                (
                    civil_date_to_utc(meeting_date, padded_start as i32, tz),
                    civil_date_to_utc(meeting_date, padded_end as i32, tz),
                )
            })
            .collect();

        let mut day_slots: Vec<Slot> = Vec::new();

        for window in &day_windows {
            let usable_start = window.start_minute + buffer_before;
            let latest_start = window.end_minute - duration - buffer_after;

            let mut minute = usable_start;
            while minute <= latest_start {
                let start = civil_date_to_utc(meeting_date, minute as i32, tz);
                let end = start + Duration::minutes(duration);
                minute += SLOT_STEP_MINUTES;

                if start < earliest_start || start > horizon_end {
                    continue;
                }

                // Spillover dates may only contribute slots belonging to the
                // requested viewer-day.
                if start < viewer_start || start >= viewer_end {
                    continue;
                }

                if meeting_type.no_overnight_slots {
                    let viewer_minute = minutes_since_midnight_in_zone(start, viewer_tz);
                    if viewer_minute < OVERNIGHT_MORNING_MINUTE
                        || viewer_minute >= OVERNIGHT_EVENING_MINUTE
                    {
                        continue;
                    }
                }

                // The candidate carries the buffer padding; it is never
                // compared raw against a blocking interval.
                let busy_start = start - Duration::minutes(buffer_before);
                let busy_end = end + Duration::minutes(buffer_after);

                let conflicts = blackouts
                    .iter()
                    .any(|b| busy_start < b.end_time && b.start_time < busy_end)
                    || recurring_blocks
                        .iter()
                        .any(|&(bs, be)| busy_start < be && bs < busy_end)
                    || booking_blocks
                        .iter()
                        .any(|&(bs, be)| busy_start < be && bs < busy_end);
                if conflicts {
                    continue;
                }

                day_slots.push(Slot {
                    start,
                    end,
                    viewer_label: civil_time_label_in_zone(start, viewer_tz),
                    meeting_label: civil_time_label_in_zone(start, tz),
                    is_busy: None,
                });
            }
        }

        day_slots.sort_by_key(|s| s.start);
        apply_visibility_shaping(meeting_type, meeting_date, &mut day_slots);
        slots.append(&mut day_slots);
    }

    if settings.is_some_and(|s| s.global_unavailable) {
        for slot in &mut slots {
            slot.is_busy = Some(true);
        }
    }

    slots.sort_by_key(|s| s.start);
    Ok(slots)
}

/// Per-date visibility shaping. `daily_limit` drops the tail outright;
/// `busy` keeps every slot but flags a deterministic pseudo-random subset,
/// never all of them.
fn apply_visibility_shaping(meeting_type: &MeetingType, date: NaiveDate, slots: &mut Vec<Slot>) {
    match meeting_type.availability_mode.as_str() {
        availability_mode::DAILY_LIMIT => {
            if meeting_type.daily_limit > 0 {
                slots.truncate(meeting_type.daily_limit as usize);
            }
        }
        availability_mode::BUSY => {
            if slots.is_empty() {
                return;
            }

            let percent = meeting_type.busy_hide_percent.clamp(10, 90);
            let count = slots.len();
            // ceil(count * percent / 100), but never hide every slot.
            let hide_count =
                (((count as i64 * percent + 99) / 100) as usize).min(count.saturating_sub(1));
            if hide_count == 0 {
                return;
            }

            let seed_base = format!(
                "{}:{}:{}",
                meeting_type.id, date, meeting_type.busy_pattern_version
            );
            let mut scored: Vec<(u32, usize)> = slots
                .iter()
                .enumerate()
                .map(|(index, slot)| {
                    let score =
                        pattern_hash(&format!("{}:{}", seed_base, slot.start.timestamp()));
                    (score, index)
                })
                .collect();
            scored.sort_unstable();

            for &(_, index) in scored.iter().take(hide_count) {
                slots[index].is_busy = Some(true);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const LA: &str = "America/Los_Angeles";

    fn meeting_type() -> MeetingType {
        let created = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .unwrap()
            .naive_utc();
        MeetingType {
            id: "mt-1".to_string(),
            slug: "intro-call".to_string(),
            admin_username: "admin".to_string(),
            title: "Intro Call".to_string(),
            description: None,
            duration_minutes: 30,
            buffer_before_minutes: 5,
            buffer_after_minutes: 5,
            min_notice_minutes: 0,
            max_horizon_days: 30,
            time_zone: LA.to_string(),
            availability_mode: availability_mode::ALL.to_string(),
            busy_hide_percent: 50,
            busy_pattern_version: 1,
            daily_limit: 0,
            show_header: false,
            no_overnight_slots: false,
            allow_public_reschedule: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn settings() -> ScheduleSettings {
        let created = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .unwrap()
            .naive_utc();
        ScheduleSettings {
            admin_username: "admin".to_string(),
            primary_time_zone: None,
            travel_mode_enabled: false,
            travel_time_zone: None,
            travel_start_date: None,
            travel_end_date: None,
            global_unavailable: false,
            created_at: created,
            updated_at: created,
        }
    }

    fn window(day_of_week: i64, start_minute: i64, end_minute: i64) -> WeeklyAvailability {
        WeeklyAvailability {
            id: format!("wa-{}-{}", day_of_week, start_minute),
            meeting_type_id: "mt-1".to_string(),
            day_of_week,
            start_minute,
            end_minute,
        }
    }

    fn weekly_blackout(day_of_week: i64, start_minute: i64, end_minute: i64) -> WeeklyBlackout {
        WeeklyBlackout {
            id: format!("wb-{}-{}", day_of_week, start_minute),
            meeting_type_id: "mt-1".to_string(),
            day_of_week,
            start_minute,
            end_minute,
        }
    }

    fn blackout(start: DateTime<Utc>, end: DateTime<Utc>) -> Blackout {
        Blackout {
            id: "bl-1".to_string(),
            meeting_type_id: "mt-1".to_string(),
            start_time: start,
            end_time: end,
            all_day: false,
            note: None,
            created_at: start.naive_utc(),
        }
    }

    fn booking(start: DateTime<Utc>, end: DateTime<Utc>, status: &str) -> Booking {
        Booking {
            id: "bk-1".to_string(),
            meeting_type_id: "mt-1".to_string(),
            start_time: start,
            end_time: end,
            attendee_name: "Alex".to_string(),
            attendee_email: "alex@example.com".to_string(),
            notes: None,
            status: status.to_string(),
            reschedule_token: None,
            booking_time_zone: None,
            zoom_join_url: None,
            zoom_start_url: None,
            created_at: start.naive_utc(),
            updated_at: start.naive_utc(),
        }
    }

    fn monday() -> NaiveDate {
        // 2025-06-02 is a Monday.
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    /// Midnight UTC before the test Monday starts in Los Angeles.
    fn monday_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
    }

    fn la_instant(hour: u32, minute: u32) -> DateTime<Utc> {
        // PDT in June: UTC-7.
        Utc.with_ymd_and_hms(2025, 6, 2, hour + 7, minute, 0).unwrap()
    }

    fn compute(
        mt: &MeetingType,
        availability: &[WeeklyAvailability],
        weekly_blackouts: &[WeeklyBlackout],
        blackouts: &[Blackout],
        bookings: &[Booking],
    ) -> Vec<Slot> {
        compute_slots(
            mt,
            availability,
            weekly_blackouts,
            blackouts,
            bookings,
            monday(),
            LA,
            Some(&settings()),
            monday_now(),
        )
        .unwrap()
    }

    // Monday 09:00-12:00 with 30-minute meetings and 5/5 buffers yields
    // starts 09:05, 09:20, ..., 11:20 (latest permissible start is
    // 720 - 30 - 5 = 685, and the 15-minute grid tops out at 680).
    #[test]
    fn monday_morning_scenario() {
        let mt = meeting_type();
        let slots = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);

        assert_eq!(slots.len(), 10);
        assert_eq!(slots[0].start, la_instant(9, 5));
        assert_eq!(slots[0].viewer_label, "9:05 AM");
        assert_eq!(slots[0].meeting_label, "9:05 AM");
        assert_eq!(slots[1].start, la_instant(9, 20));
        assert_eq!(slots[9].start, la_instant(11, 20));
        assert!(slots.iter().all(|s| s.is_busy.is_none()));

        for slot in &slots {
            assert!(slot.start < slot.end);
            assert_eq!(slot.end - slot.start, Duration::minutes(30));
        }
    }

    #[test]
    fn no_availability_means_closed() {
        let mt = meeting_type();
        // Tuesday-only availability, queried for Monday.
        let slots = compute(&mt, &[window(2, 540, 720)], &[], &[], &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn window_too_small_for_duration_yields_nothing() {
        let mt = meeting_type();
        // 09:00-09:30: latest start = 570 - 30 - 5 = 535, before the
        // usable start of 545.
        let slots = compute(&mt, &[window(1, 540, 570)], &[], &[], &[]);
        assert!(slots.is_empty());
    }

    #[test]
    fn one_off_blackout_removes_exactly_padded_overlaps() {
        let mt = meeting_type();
        // Blackout 10:00-10:30 local. A slot is removed iff its padded
        // interval (start-5, end+5) intersects it: starts 09:35 through
        // 10:20 on the grid. 09:20 and 10:35 survive.
        let slots = compute(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[blackout(la_instant(10, 0), la_instant(10, 30))],
            &[],
        );

        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![
                la_instant(9, 5),
                la_instant(9, 20),
                la_instant(10, 35),
                la_instant(10, 50),
                la_instant(11, 5),
                la_instant(11, 20),
            ]
        );
    }

    #[test]
    fn active_booking_blocks_with_double_sided_gap() {
        let mt = meeting_type();
        // Booking 10:00-10:30; both the booking and the candidate carry
        // their buffers, so 10:35 is also blocked (gap = before + after).
        let slots = compute(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[booking(
                la_instant(10, 0),
                la_instant(10, 30),
                booking_status::ACTIVE,
            )],
        );

        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![
                la_instant(9, 5),
                la_instant(9, 20),
                la_instant(10, 50),
                la_instant(11, 5),
                la_instant(11, 20),
            ]
        );
    }

    #[test]
    fn canceled_bookings_never_reduce_availability() {
        let mt = meeting_type();
        let baseline = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);
        let with_canceled = compute(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[booking(
                la_instant(10, 0),
                la_instant(10, 30),
                booking_status::CANCELED,
            )],
        );
        assert_eq!(baseline, with_canceled);
    }

    #[test]
    fn recurring_blackout_is_padded_and_clamped() {
        let mt = meeting_type();
        // Weekly blackout Monday 10:00-10:30 padded to (595, 635): blocks
        // every candidate whose padded interval touches it.
        let slots = compute(
            &mt,
            &[window(1, 540, 720)],
            &[weekly_blackout(1, 600, 630)],
            &[],
            &[],
        );

        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        assert_eq!(
            starts,
            vec![
                la_instant(9, 5),
                la_instant(9, 20),
                la_instant(10, 50),
                la_instant(11, 5),
                la_instant(11, 20),
            ]
        );
    }

    #[test]
    fn min_notice_rejects_near_slots() {
        let mut mt = meeting_type();
        mt.min_notice_minutes = 60;
        // now = 10:00 local; earliest start 11:00.
        let slots = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            monday(),
            LA,
            Some(&settings()),
            la_instant(10, 0),
        )
        .unwrap();

        let starts: Vec<DateTime<Utc>> = slots.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![la_instant(11, 5), la_instant(11, 20)]);
    }

    #[test]
    fn horizon_rejects_far_dates() {
        let mut mt = meeting_type();
        mt.max_horizon_days = 7;
        // Request a Monday five weeks past `now`.
        let far_monday = NaiveDate::from_ymd_opt(2025, 7, 7).unwrap();
        let slots = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            far_monday,
            LA,
            Some(&settings()),
            monday_now(),
        )
        .unwrap();
        assert!(slots.is_empty());
    }

    #[test]
    fn daily_limit_caps_slot_count() {
        let mut mt = meeting_type();
        mt.availability_mode = availability_mode::DAILY_LIMIT.to_string();
        mt.daily_limit = 3;
        let slots = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);

        assert_eq!(slots.len(), 3);
        // The first slots of the day survive; nothing is flagged busy.
        assert_eq!(slots[0].start, la_instant(9, 5));
        assert!(slots.iter().all(|s| s.is_busy.is_none()));
    }

    #[test]
    fn busy_mode_never_hides_every_slot() {
        let mut mt = meeting_type();
        mt.availability_mode = availability_mode::BUSY.to_string();
        mt.busy_hide_percent = 100; // clamped to 90
        let slots = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);

        assert_eq!(slots.len(), 10);
        let hidden = slots.iter().filter(|s| s.is_busy == Some(true)).count();
        assert_eq!(hidden, 9);
    }

    #[test]
    fn busy_mode_is_deterministic() {
        let mut mt = meeting_type();
        mt.availability_mode = availability_mode::BUSY.to_string();
        mt.busy_hide_percent = 50;
        let first = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);
        let second = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);
        assert_eq!(first, second);

        let hidden = first.iter().filter(|s| s.is_busy == Some(true)).count();
        assert_eq!(hidden, 5); // ceil(10 * 50 / 100)
    }

    #[test]
    fn global_unavailable_flags_everything() {
        let mt = meeting_type();
        let mut s = settings();
        s.global_unavailable = true;
        let slots = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            monday(),
            LA,
            Some(&s),
            monday_now(),
        )
        .unwrap();

        assert_eq!(slots.len(), 10);
        assert!(slots.iter().all(|s| s.is_busy == Some(true)));
    }

    #[test]
    fn travel_mode_overrides_zone_within_window() {
        let mt = meeting_type();
        let mut s = settings();
        s.travel_mode_enabled = true;
        s.travel_time_zone = Some("Europe/London".to_string());
        s.travel_start_date = NaiveDate::from_ymd_opt(2025, 3, 1);
        s.travel_end_date = NaiveDate::from_ymd_opt(2025, 3, 10);

        let inside = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let outside = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

        assert_eq!(
            effective_time_zone(&mt, inside, Some(&s)).unwrap(),
            chrono_tz::Europe::London
        );
        assert_eq!(
            effective_time_zone(&mt, outside, Some(&s)).unwrap(),
            chrono_tz::America::Los_Angeles
        );
    }

    #[test]
    fn primary_zone_overrides_meeting_default() {
        let mt = meeting_type();
        let mut s = settings();
        s.primary_time_zone = Some("America/Denver".to_string());

        assert_eq!(
            effective_time_zone(&mt, monday(), Some(&s)).unwrap(),
            chrono_tz::America::Denver
        );
        assert_eq!(
            effective_time_zone(&mt, monday(), None).unwrap(),
            chrono_tz::America::Los_Angeles
        );
    }

    #[test]
    fn invalid_time_zone_fails_loudly() {
        let mut mt = meeting_type();
        mt.time_zone = "Mars/Olympus_Mons".to_string();
        let result = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            monday(),
            LA,
            None,
            monday_now(),
        );
        assert!(matches!(result, Err(SlotError::InvalidTimeZone(_))));

        let result = compute_slots(
            &meeting_type(),
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            monday(),
            "garbage",
            None,
            monday_now(),
        );
        assert!(matches!(result, Err(SlotError::InvalidTimeZone(_))));
    }

    #[test]
    fn overnight_suppression_in_viewer_zone() {
        let mut mt = meeting_type();
        mt.time_zone = "UTC".to_string();
        mt.no_overnight_slots = true;
        mt.buffer_before_minutes = 0;
        mt.buffer_after_minutes = 0;
        // Open all of Monday.
        let slots = compute_slots(
            &mt,
            &[window(1, 0, 1440)],
            &[],
            &[],
            &[],
            monday(),
            "UTC",
            None,
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();

        assert!(!slots.is_empty());
        let utc: chrono_tz::Tz = "UTC".parse().unwrap();
        for slot in &slots {
            let minute = minutes_since_midnight_in_zone(slot.start, utc);
            assert!((420..1260).contains(&minute), "minute {}", minute);
        }
    }

    // A Tokyo viewer's Tuesday overlaps the Los Angeles Monday; slots are
    // generated from the meeting-side Monday but bounded by the viewer-day.
    #[test]
    fn cross_zone_viewer_day_pulls_adjacent_meeting_date() {
        let mt = meeting_type();
        let tokyo_tuesday = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let slots = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            tokyo_tuesday,
            "Asia/Tokyo",
            Some(&settings()),
            monday_now(),
        )
        .unwrap();

        assert_eq!(slots.len(), 10);

        let tokyo: chrono_tz::Tz = "Asia/Tokyo".parse().unwrap();
        let viewer_start = civil_date_to_utc(tokyo_tuesday, 0, tokyo);
        let viewer_end = civil_date_to_utc(tokyo_tuesday, 1440, tokyo);
        for slot in &slots {
            assert!(slot.start >= viewer_start && slot.start < viewer_end);
        }

        // The same slots viewed from Los Angeles belong to the Monday page,
        // so the Tokyo Monday page must not also offer them.
        let tokyo_monday = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let monday_page = compute_slots(
            &mt,
            &[window(1, 540, 720)],
            &[],
            &[],
            &[],
            tokyo_monday,
            "Asia/Tokyo",
            Some(&settings()),
            monday_now(),
        )
        .unwrap();
        assert!(monday_page.is_empty());
    }

    #[test]
    fn output_is_globally_sorted() {
        let mt = meeting_type();
        // Two overlapping windows on the same day; merged output must still
        // be ordered by start instant.
        let slots = compute(
            &mt,
            &[window(1, 600, 720), window(1, 540, 660)],
            &[],
            &[],
            &[],
        );
        for pair in slots.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn busy_flag_omitted_from_json_when_absent() {
        let mt = meeting_type();
        let slots = compute(&mt, &[window(1, 540, 720)], &[], &[], &[]);
        let json = serde_json::to_value(&slots[0]).unwrap();
        assert!(json.get("is_busy").is_none());
        assert!(json.get("viewer_label").is_some());
    }
}
