use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{WeeklyAvailability, WeeklyBlackout, WeeklyWindow};
use crate::error::{AppError, AppResult};

/// Repository for recurring weekly windows (`weekly_availability` and
/// `weekly_blackouts` tables). Updates are full replaces inside a
/// transaction so a partial write is never observed.
pub struct AvailabilityRepository;

impl AvailabilityRepository {
    pub async fn find_weekly_availability(
        pool: &SqlitePool,
        meeting_type_id: &str,
    ) -> AppResult<Vec<WeeklyAvailability>> {
        let rows = sqlx::query_as::<_, WeeklyAvailability>(
            r#"
            SELECT * FROM weekly_availability
            WHERE meeting_type_id = ?
            ORDER BY day_of_week, start_minute
            "#,
        )
        .bind(meeting_type_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    pub async fn find_weekly_blackouts(
        pool: &SqlitePool,
        meeting_type_id: &str,
    ) -> AppResult<Vec<WeeklyBlackout>> {
        let rows = sqlx::query_as::<_, WeeklyBlackout>(
            r#"
            SELECT * FROM weekly_blackouts
            WHERE meeting_type_id = ?
            ORDER BY day_of_week, start_minute
            "#,
        )
        .bind(meeting_type_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Replace all weekly availability rows for a meeting type.
    pub async fn replace_weekly_availability(
        pool: &SqlitePool,
        meeting_type_id: &str,
        windows: &[WeeklyWindow],
    ) -> AppResult<Vec<WeeklyAvailability>> {
        validate_windows(windows)?;

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM weekly_availability WHERE meeting_type_id = ?")
            .bind(meeting_type_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for window in windows {
            sqlx::query(
                r#"
                INSERT INTO weekly_availability (id, meeting_type_id, day_of_week, start_minute, end_minute)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(meeting_type_id)
            .bind(window.day_of_week)
            .bind(window.start_minute)
            .bind(window.end_minute)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Self::find_weekly_availability(pool, meeting_type_id).await
    }

    /// Replace all weekly blackout rows for a meeting type.
    pub async fn replace_weekly_blackouts(
        pool: &SqlitePool,
        meeting_type_id: &str,
        windows: &[WeeklyWindow],
    ) -> AppResult<Vec<WeeklyBlackout>> {
        validate_windows(windows)?;

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        sqlx::query("DELETE FROM weekly_blackouts WHERE meeting_type_id = ?")
            .bind(meeting_type_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for window in windows {
            sqlx::query(
                r#"
                INSERT INTO weekly_blackouts (id, meeting_type_id, day_of_week, start_minute, end_minute)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(meeting_type_id)
            .bind(window.day_of_week)
            .bind(window.start_minute)
            .bind(window.end_minute)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Self::find_weekly_blackouts(pool, meeting_type_id).await
    }
}

fn validate_windows(windows: &[WeeklyWindow]) -> AppResult<()> {
    for window in windows {
        if !(0..=6).contains(&window.day_of_week) {
            return Err(AppError::Validation(format!(
                "day_of_week must be 0-6, got {}",
                window.day_of_week
            )));
        }
        if window.start_minute < 0
            || window.end_minute > 1440
            || window.start_minute >= window.end_minute
        {
            return Err(AppError::Validation(format!(
                "Invalid minute window {}-{}",
                window.start_minute, window.end_minute
            )));
        }
    }
    Ok(())
}
