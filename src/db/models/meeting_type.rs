use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// How computed slots are shaped before being shown on the public page.
pub mod availability_mode {
    /// Show every computed slot.
    pub const ALL: &str = "all";
    /// Hide a pseudo-random percentage to simulate a busy calendar.
    pub const BUSY: &str = "busy";
    /// Cap the number of slots shown per day.
    pub const DAILY_LIMIT: &str = "daily_limit";
}

/// A bookable meeting template.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct MeetingType {
    pub id: String,
    pub slug: String,
    pub admin_username: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub buffer_before_minutes: i64,
    pub buffer_after_minutes: i64,
    pub min_notice_minutes: i64,
    pub max_horizon_days: i64,
    /// Default IANA timezone; schedule settings may override it per date.
    pub time_zone: String,
    /// One of `all`, `busy`, `daily_limit` (see [`availability_mode`]).
    pub availability_mode: String,
    /// Percentage of slots hidden in `busy` mode; clamped to [10, 90] on use.
    pub busy_hide_percent: i64,
    /// Bumped by the owner to reseed the busy pattern without changing
    /// real availability.
    pub busy_pattern_version: i64,
    /// Max slots shown per day in `daily_limit` mode; 0 means no cap.
    pub daily_limit: i64,
    pub show_header: bool,
    /// Suppress slots before 07:00 or at/after 21:00 in the viewer's zone.
    pub no_overnight_slots: bool,
    pub allow_public_reschedule: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Payload for creating or updating a meeting type. When `id` is `None` a new
/// row is created; otherwise the existing row is updated in place.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertMeetingType {
    pub id: Option<String>,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub buffer_before_minutes: i64,
    pub buffer_after_minutes: i64,
    pub min_notice_minutes: i64,
    pub max_horizon_days: i64,
    pub time_zone: String,
    pub availability_mode: String,
    pub busy_hide_percent: i64,
    pub busy_pattern_version: i64,
    pub daily_limit: i64,
    pub show_header: bool,
    pub no_overnight_slots: bool,
    pub allow_public_reschedule: bool,
}
