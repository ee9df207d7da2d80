use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A one-off closed interval in absolute UTC instants, scoped to one meeting
/// type. Inserted and deleted individually.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Blackout {
    pub id: String,
    pub meeting_type_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBlackout {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub note: Option<String>,
}
