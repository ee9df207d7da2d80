use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::models::{booking_status, Booking, CreateBooking, MeetingType};
use crate::db::{
    AvailabilityRepository, BlackoutRepository, BookingRepository, MeetingTypeRepository,
    ScheduleSettingsRepository,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::timezone::{civil_date_in_zone, list_dates_from_start, parse_time_zone};
use crate::scheduling::{compute_slots, Slot};
use crate::AppState;

/// Orchestrates the pure slot engine over stored rows and drives the
/// booking lifecycle (create, reschedule, cancel).
pub struct SchedulingService;

/// One entry of the date-picker overview: a viewer-day and how many
/// offerable (non-busy) slots it carries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DayOverview {
    pub date: NaiveDate,
    pub open_slots: usize,
}

/// Attendee-supplied details for a new booking.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub start_time: DateTime<Utc>,
    pub attendee_name: String,
    pub attendee_email: String,
    pub notes: Option<String>,
    pub viewer_time_zone: String,
}

impl SchedulingService {
    /// Compute the bookable slots of one meeting type for one viewer-day.
    pub async fn slots_for_date(
        state: &Arc<AppState>,
        meeting_type: &MeetingType,
        date: NaiveDate,
        viewer_time_zone: &str,
    ) -> AppResult<Vec<Slot>> {
        let availability =
            AvailabilityRepository::find_weekly_availability(&state.db, &meeting_type.id).await?;
        let weekly_blackouts =
            AvailabilityRepository::find_weekly_blackouts(&state.db, &meeting_type.id).await?;
        let blackouts = BlackoutRepository::find_by_meeting_type(&state.db, &meeting_type.id).await?;
        let bookings =
            BookingRepository::find_active_by_meeting_type(&state.db, &meeting_type.id).await?;
        let settings =
            ScheduleSettingsRepository::find_by_admin(&state.db, &meeting_type.admin_username)
                .await?;

        let slots = compute_slots(
            meeting_type,
            &availability,
            &weekly_blackouts,
            &blackouts,
            &bookings,
            date,
            viewer_time_zone,
            settings.as_ref(),
            Utc::now(),
        )?;

        Ok(slots)
    }

    /// Lookahead summary for the date picker: for each viewer-day starting
    /// at `start`, the number of offerable slots. Rows are loaded once and
    /// reused across the whole span.
    pub async fn days_overview(
        state: &Arc<AppState>,
        meeting_type: &MeetingType,
        start: NaiveDate,
        count: usize,
        viewer_time_zone: &str,
    ) -> AppResult<Vec<DayOverview>> {
        let availability =
            AvailabilityRepository::find_weekly_availability(&state.db, &meeting_type.id).await?;
        let weekly_blackouts =
            AvailabilityRepository::find_weekly_blackouts(&state.db, &meeting_type.id).await?;
        let blackouts = BlackoutRepository::find_by_meeting_type(&state.db, &meeting_type.id).await?;
        let bookings =
            BookingRepository::find_active_by_meeting_type(&state.db, &meeting_type.id).await?;
        let settings =
            ScheduleSettingsRepository::find_by_admin(&state.db, &meeting_type.admin_username)
                .await?;

        let now = Utc::now();
        let mut overview = Vec::new();
        for date in list_dates_from_start(start, count) {
            let slots = compute_slots(
                meeting_type,
                &availability,
                &weekly_blackouts,
                &blackouts,
                &bookings,
                date,
                viewer_time_zone,
                settings.as_ref(),
                now,
            )?;
            let open_slots = slots.iter().filter(|s| s.is_busy.is_none()).count();
            overview.push(DayOverview { date, open_slots });
        }

        Ok(overview)
    }

    /// Create a booking after re-validating the requested start against a
    /// fresh slot computation.
    pub async fn create_booking(
        state: &Arc<AppState>,
        meeting_type: &MeetingType,
        request: BookingRequest,
    ) -> AppResult<Booking> {
        validate_attendee(&request.attendee_name, &request.attendee_email)?;

        Self::ensure_slot_is_offerable(
            state,
            meeting_type,
            request.start_time,
            &request.viewer_time_zone,
            None,
        )
        .await?;

        let end_time = request.start_time + Duration::minutes(meeting_type.duration_minutes);

        // Meeting links are best supplied at creation but their absence must
        // not lose the booking; the remote call happens before the insert so
        // a stored booking always reflects what the attendee was told.
        let mut zoom_join_url = None;
        let mut zoom_start_url = None;
        if let Some(zoom) = state.zoom.as_ref() {
            match zoom
                .create_meeting(
                    &meeting_type.title,
                    request.start_time,
                    meeting_type.duration_minutes,
                )
                .await
            {
                Ok(meeting) => {
                    zoom_join_url = Some(meeting.join_url);
                    zoom_start_url = Some(meeting.start_url);
                }
                Err(e) => {
                    warn!(
                        "Zoom meeting creation failed for {}: {:?}; booking continues without links",
                        meeting_type.slug, e
                    );
                }
            }
        }

        let booking = BookingRepository::insert(
            &state.db,
            CreateBooking {
                meeting_type_id: meeting_type.id.clone(),
                start_time: request.start_time,
                end_time,
                attendee_name: request.attendee_name,
                attendee_email: request.attendee_email,
                notes: request.notes,
                reschedule_token: Some(Uuid::new_v4().to_string()),
                booking_time_zone: Some(request.viewer_time_zone),
                zoom_join_url,
                zoom_start_url,
            },
        )
        .await?;

        info!(
            "Created booking {} for meeting type {} at {}",
            booking.id, meeting_type.slug, booking.start_time
        );

        Ok(booking)
    }

    /// Move a booking to a new slot using its public reschedule token.
    pub async fn reschedule_booking(
        state: &Arc<AppState>,
        token: &str,
        new_start: DateTime<Utc>,
        viewer_time_zone: &str,
    ) -> AppResult<Booking> {
        let booking = BookingRepository::find_by_reschedule_token(&state.db, token)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.status == booking_status::CANCELED {
            return Err(AppError::BadRequest(
                "Canceled bookings cannot be rescheduled".to_string(),
            ));
        }

        let meeting_type = MeetingTypeRepository::find_by_id(&state.db, &booking.meeting_type_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Meeting type not found".to_string()))?;

        if !meeting_type.allow_public_reschedule {
            return Err(AppError::Forbidden);
        }

        // The booking being moved must not block its own new slot.
        Self::ensure_slot_is_offerable(
            state,
            &meeting_type,
            new_start,
            viewer_time_zone,
            Some(&booking.id),
        )
        .await?;

        let new_end = new_start + Duration::minutes(meeting_type.duration_minutes);
        let updated = BookingRepository::update_times(&state.db, &booking.id, new_start, new_end)
            .await?;

        info!(
            "Rescheduled booking {} for meeting type {} to {}",
            updated.id, meeting_type.slug, updated.start_time
        );

        Ok(updated)
    }

    /// Cancel a booking using its public reschedule token.
    pub async fn cancel_booking(state: &Arc<AppState>, token: &str) -> AppResult<Booking> {
        let booking = BookingRepository::find_by_reschedule_token(&state.db, token)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        if booking.status != booking_status::CANCELED {
            BookingRepository::cancel(&state.db, &booking.id).await?;
        }

        BookingRepository::find_by_id(&state.db, &booking.id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))
    }

    /// Verify that `start` is one of the currently offerable (non-busy)
    /// slots for its viewer-day, optionally ignoring one existing booking.
    async fn ensure_slot_is_offerable(
        state: &Arc<AppState>,
        meeting_type: &MeetingType,
        start: DateTime<Utc>,
        viewer_time_zone: &str,
        exclude_booking_id: Option<&str>,
    ) -> AppResult<()> {
        let viewer_tz = parse_time_zone(viewer_time_zone).map_err(AppError::Scheduling)?;
        let viewer_date = civil_date_in_zone(start, viewer_tz);

        let availability =
            AvailabilityRepository::find_weekly_availability(&state.db, &meeting_type.id).await?;
        let weekly_blackouts =
            AvailabilityRepository::find_weekly_blackouts(&state.db, &meeting_type.id).await?;
        let blackouts = BlackoutRepository::find_by_meeting_type(&state.db, &meeting_type.id).await?;
        let mut bookings =
            BookingRepository::find_active_by_meeting_type(&state.db, &meeting_type.id).await?;
        if let Some(exclude) = exclude_booking_id {
            bookings.retain(|b| b.id != exclude);
        }
        let settings =
            ScheduleSettingsRepository::find_by_admin(&state.db, &meeting_type.admin_username)
                .await?;

        let slots = compute_slots(
            meeting_type,
            &availability,
            &weekly_blackouts,
            &blackouts,
            &bookings,
            viewer_date,
            viewer_time_zone,
            settings.as_ref(),
            Utc::now(),
        )?;

        let offerable = slots
            .iter()
            .any(|slot| slot.start == start && slot.is_busy.is_none());
        if !offerable {
            return Err(AppError::Conflict(
                "Requested time is no longer available".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_attendee(name: &str, email: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "Attendee name cannot be empty".to_string(),
        ));
    }
    if name.len() > 200 {
        return Err(AppError::Validation(
            "Attendee name cannot exceed 200 characters".to_string(),
        ));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid attendee email is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendee_validation() {
        assert!(validate_attendee("Alex", "alex@example.com").is_ok());
        assert!(validate_attendee("", "alex@example.com").is_err());
        assert!(validate_attendee("Alex", "not-an-email").is_err());
        assert!(validate_attendee(&"x".repeat(201), "alex@example.com").is_err());
    }
}
