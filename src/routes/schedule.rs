use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{booking_status, Booking, MeetingType};
use crate::db::MeetingTypeRepository;
use crate::error::{AppError, AppResult};
use crate::scheduling::timezone::parse_time_zone;
use crate::scheduling::Slot;
use crate::services::scheduling::{BookingRequest, DayOverview, SchedulingService};
use crate::AppState;

/// Public booking-page routes. Everything here is reachable without
/// credentials, so responses are stripped down to what an attendee needs.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings/:token", get(get_booking).delete(cancel_booking))
        .route("/bookings/:token/reschedule", put(reschedule_booking))
        .route("/:slug", get(get_public_meeting_type))
        .route("/:slug/slots", get(get_slots))
        .route("/:slug/days", get(get_days_overview))
        .route("/:slug/bookings", post(create_booking))
}

/// Attendee-facing view of a meeting type. Internal knobs (buffers, busy
/// shaping, horizon) stay server-side.
#[derive(Debug, Serialize)]
pub struct PublicMeetingType {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub time_zone: String,
    pub show_header: bool,
    pub allow_public_reschedule: bool,
}

impl From<MeetingType> for PublicMeetingType {
    fn from(mt: MeetingType) -> Self {
        PublicMeetingType {
            slug: mt.slug,
            title: mt.title,
            description: mt.description,
            duration_minutes: mt.duration_minutes,
            time_zone: mt.time_zone,
            show_header: mt.show_header,
            allow_public_reschedule: mt.allow_public_reschedule,
        }
    }
}

/// Attendee-facing view of a booking. The host-only start URL is withheld.
#[derive(Debug, Serialize)]
pub struct PublicBooking {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendee_name: String,
    pub status: String,
    pub reschedule_token: Option<String>,
    pub booking_time_zone: Option<String>,
    pub zoom_join_url: Option<String>,
}

impl From<Booking> for PublicBooking {
    fn from(booking: Booking) -> Self {
        PublicBooking {
            start_time: booking.start_time,
            end_time: booking.end_time,
            attendee_name: booking.attendee_name,
            status: booking.status,
            reschedule_token: booking.reschedule_token,
            booking_time_zone: booking.booking_time_zone,
            zoom_join_url: booking.zoom_join_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub time_zone: String,
}

#[derive(Debug, Deserialize)]
pub struct DaysQuery {
    pub start: String,
    pub time_zone: String,
    /// Number of days to summarize; defaults to 30, capped server-side.
    pub days: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub start_time: DateTime<Utc>,
    pub attendee_name: String,
    pub attendee_email: String,
    pub notes: Option<String>,
    pub time_zone: String,
}

#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    pub start_time: DateTime<Utc>,
    pub time_zone: String,
}

async fn load_by_slug(state: &Arc<AppState>, slug: &str) -> AppResult<MeetingType> {
    MeetingTypeRepository::find_by_slug(&state.db, slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Meeting type {} not found", slug)))
}

async fn get_public_meeting_type(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> AppResult<Json<PublicMeetingType>> {
    let meeting_type = load_by_slug(&state, &slug).await?;
    Ok(Json(meeting_type.into()))
}

/// Compute the bookable slots for one viewer-day. The date and timezone are
/// attendee-supplied, so anything malformed is a 400, not a 500.
async fn get_slots(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<Json<Vec<Slot>>> {
    let meeting_type = load_by_slug(&state, &slug).await?;

    let date = NaiveDate::parse_from_str(&query.date, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", query.date)))?;
    parse_time_zone(&query.time_zone)
        .map_err(|_| AppError::BadRequest(format!("Unknown timezone: {}", query.time_zone)))?;

    let slots =
        SchedulingService::slots_for_date(&state, &meeting_type, date, &query.time_zone).await?;
    Ok(Json(slots))
}

/// Date-picker overview: per-day offerable slot counts over a lookahead
/// span. The span is clamped by the timezone helper's own cap.
async fn get_days_overview(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Query(query): Query<DaysQuery>,
) -> AppResult<Json<Vec<DayOverview>>> {
    let meeting_type = load_by_slug(&state, &slug).await?;

    let start = NaiveDate::parse_from_str(&query.start, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date: {}", query.start)))?;
    parse_time_zone(&query.time_zone)
        .map_err(|_| AppError::BadRequest(format!("Unknown timezone: {}", query.time_zone)))?;

    let count = query.days.unwrap_or(30);
    let overview =
        SchedulingService::days_overview(&state, &meeting_type, start, count, &query.time_zone)
            .await?;
    Ok(Json(overview))
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<Json<PublicBooking>> {
    let meeting_type = load_by_slug(&state, &slug).await?;
    parse_time_zone(&request.time_zone)
        .map_err(|_| AppError::BadRequest(format!("Unknown timezone: {}", request.time_zone)))?;

    let booking = SchedulingService::create_booking(
        &state,
        &meeting_type,
        BookingRequest {
            start_time: request.start_time,
            attendee_name: request.attendee_name,
            attendee_email: request.attendee_email,
            notes: request.notes,
            viewer_time_zone: request.time_zone,
        },
    )
    .await?;

    Ok(Json(booking.into()))
}

async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<PublicBooking>> {
    let booking = crate::db::BookingRepository::find_by_reschedule_token(&state.db, &token)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;
    Ok(Json(booking.into()))
}

async fn reschedule_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
    Json(request): Json<RescheduleRequest>,
) -> AppResult<Json<PublicBooking>> {
    parse_time_zone(&request.time_zone)
        .map_err(|_| AppError::BadRequest(format!("Unknown timezone: {}", request.time_zone)))?;

    let booking = SchedulingService::reschedule_booking(
        &state,
        &token,
        request.start_time,
        &request.time_zone,
    )
    .await?;
    Ok(Json(booking.into()))
}

async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> AppResult<Json<PublicBooking>> {
    let booking = SchedulingService::cancel_booking(&state, &token).await?;
    debug_assert_eq!(booking.status, booking_status::CANCELED);
    Ok(Json(booking.into()))
}
