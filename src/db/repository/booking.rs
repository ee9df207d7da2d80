use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{booking_status, Booking, CreateBooking};
use crate::error::{AppError, AppResult};

/// Repository for reservations (`bookings` table).
pub struct BookingRepository;

impl BookingRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn find_by_meeting_type(
        pool: &SqlitePool,
        meeting_type_id: &str,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE meeting_type_id = ? ORDER BY start_time",
        )
        .bind(meeting_type_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Non-canceled bookings only; these are the rows that block slots.
    pub async fn find_active_by_meeting_type(
        pool: &SqlitePool,
        meeting_type_id: &str,
    ) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            r#"
            SELECT * FROM bookings
            WHERE meeting_type_id = ? AND status = ?
            ORDER BY start_time
            "#,
        )
        .bind(meeting_type_id)
        .bind(booking_status::ACTIVE)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    pub async fn find_by_reschedule_token(
        pool: &SqlitePool,
        token: &str,
    ) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE reschedule_token = ?")
            .bind(token)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn insert(pool: &SqlitePool, create: CreateBooking) -> AppResult<Booking> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, meeting_type_id, start_time, end_time,
                attendee_name, attendee_email, notes, status,
                reschedule_token, booking_time_zone,
                zoom_join_url, zoom_start_url, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&create.meeting_type_id)
        .bind(create.start_time)
        .bind(create.end_time)
        .bind(&create.attendee_name)
        .bind(&create.attendee_email)
        .bind(&create.notes)
        .bind(booking_status::ACTIVE)
        .bind(&create.reschedule_token)
        .bind(&create.booking_time_zone)
        .bind(&create.zoom_join_url)
        .bind(&create.zoom_start_url)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        let row = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Mark a booking canceled. Canceled rows are kept for history and never
    /// block slots again.
    pub async fn cancel(pool: &SqlitePool, id: &str) -> AppResult<()> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE bookings SET status = ?, updated_at = ? WHERE id = ?")
            .bind(booking_status::CANCELED)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(())
    }

    /// Move a booking to a new interval (public self-reschedule).
    pub async fn update_times(
        pool: &SqlitePool,
        id: &str,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let now = Utc::now().naive_utc();

        sqlx::query("UPDATE bookings SET start_time = ?, end_time = ?, updated_at = ? WHERE id = ?")
            .bind(start_time)
            .bind(end_time)
            .bind(now)
            .bind(id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }
}
