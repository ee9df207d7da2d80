use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recurring weekly open window for a meeting type. `day_of_week` is 0-6
/// with 0 = Sunday; minutes are minutes since midnight in the meeting's
/// effective timezone. Multiple rows per day are allowed.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub id: String,
    pub meeting_type_id: String,
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
}

/// A recurring weekly closed sub-window within an otherwise-open day.
/// Same shape as [`WeeklyAvailability`].
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WeeklyBlackout {
    pub id: String,
    pub meeting_type_id: String,
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
}

/// Row payload for the full-replace update of weekly availability/blackouts.
#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyWindow {
    pub day_of_week: i64,
    pub start_minute: i64,
    pub end_minute: i64,
}
