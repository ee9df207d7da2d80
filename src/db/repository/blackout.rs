use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{Blackout, CreateBlackout};
use crate::error::{AppError, AppResult};

/// Repository for one-off closed intervals (`blackouts` table).
pub struct BlackoutRepository;

impl BlackoutRepository {
    pub async fn find_by_meeting_type(
        pool: &SqlitePool,
        meeting_type_id: &str,
    ) -> AppResult<Vec<Blackout>> {
        let rows = sqlx::query_as::<_, Blackout>(
            "SELECT * FROM blackouts WHERE meeting_type_id = ? ORDER BY start_time",
        )
        .bind(meeting_type_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    pub async fn insert(
        pool: &SqlitePool,
        meeting_type_id: &str,
        create: CreateBlackout,
    ) -> AppResult<Blackout> {
        if create.end_time <= create.start_time {
            return Err(AppError::Validation(
                "Blackout end must be after start".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO blackouts (id, meeting_type_id, start_time, end_time, all_day, note, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(meeting_type_id)
        .bind(create.start_time)
        .bind(create.end_time)
        .bind(create.all_day)
        .bind(&create.note)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        let row = sqlx::query_as::<_, Blackout>("SELECT * FROM blackouts WHERE id = ?")
            .bind(&id)
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    /// Delete a blackout scoped to its meeting type. Returns whether a row
    /// was removed.
    pub async fn delete(pool: &SqlitePool, id: &str, meeting_type_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM blackouts WHERE id = ? AND meeting_type_id = ?")
            .bind(id)
            .bind(meeting_type_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }
}
