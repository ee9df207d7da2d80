use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Per-admin scheduling preferences. One row per admin identity; absence of a
/// row means "use each meeting type's defaults".
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ScheduleSettings {
    pub admin_username: String,
    /// Overrides meeting-type default timezones when set.
    pub primary_time_zone: Option<String>,
    pub travel_mode_enabled: bool,
    pub travel_time_zone: Option<String>,
    /// Inclusive civil-date bounds of the travel window.
    pub travel_start_date: Option<NaiveDate>,
    pub travel_end_date: Option<NaiveDate>,
    /// Forces every computed slot into the busy state without deleting data.
    pub global_unavailable: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertScheduleSettings {
    pub primary_time_zone: Option<String>,
    pub travel_mode_enabled: bool,
    pub travel_time_zone: Option<String>,
    pub travel_start_date: Option<NaiveDate>,
    pub travel_end_date: Option<NaiveDate>,
    pub global_unavailable: bool,
}
