use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Booking status values. Canceled bookings never block slots.
pub mod booking_status {
    pub const ACTIVE: &str = "active";
    pub const CANCELED: &str = "canceled";
}

/// A confirmed (or canceled) reservation against a meeting type.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub meeting_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendee_name: String,
    pub attendee_email: String,
    pub notes: Option<String>,
    pub status: String,
    /// Opaque token that authorizes public self-reschedule/cancel.
    pub reschedule_token: Option<String>,
    /// Viewer timezone recorded at booking time, for confirmation rendering.
    pub booking_time_zone: Option<String>,
    pub zoom_join_url: Option<String>,
    pub zoom_start_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub meeting_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendee_name: String,
    pub attendee_email: String,
    pub notes: Option<String>,
    pub reschedule_token: Option<String>,
    pub booking_time_zone: Option<String>,
    pub zoom_join_url: Option<String>,
    pub zoom_start_url: Option<String>,
}
