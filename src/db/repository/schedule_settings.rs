use chrono::Utc;
use sqlx::SqlitePool;

use crate::db::models::{ScheduleSettings, UpsertScheduleSettings};
use crate::db::repository::MeetingTypeRepository;
use crate::error::{AppError, AppResult};

/// Repository for per-admin scheduling preferences (`schedule_settings`
/// table).
pub struct ScheduleSettingsRepository;

impl ScheduleSettingsRepository {
    pub async fn find_by_admin(
        pool: &SqlitePool,
        admin_username: &str,
    ) -> AppResult<Option<ScheduleSettings>> {
        let row = sqlx::query_as::<_, ScheduleSettings>(
            "SELECT * FROM schedule_settings WHERE admin_username = ?",
        )
        .bind(admin_username)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn upsert(
        pool: &SqlitePool,
        admin_username: &str,
        update: UpsertScheduleSettings,
    ) -> AppResult<ScheduleSettings> {
        if update.travel_mode_enabled {
            if update.travel_time_zone.is_none()
                || update.travel_start_date.is_none()
                || update.travel_end_date.is_none()
            {
                return Err(AppError::Validation(
                    "Travel mode requires a timezone and start/end dates".to_string(),
                ));
            }
            if update.travel_start_date > update.travel_end_date {
                return Err(AppError::Validation(
                    "Travel start date must not be after the end date".to_string(),
                ));
            }
        }

        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO schedule_settings (
                admin_username, primary_time_zone, travel_mode_enabled,
                travel_time_zone, travel_start_date, travel_end_date,
                global_unavailable, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(admin_username) DO UPDATE SET
                primary_time_zone = excluded.primary_time_zone,
                travel_mode_enabled = excluded.travel_mode_enabled,
                travel_time_zone = excluded.travel_time_zone,
                travel_start_date = excluded.travel_start_date,
                travel_end_date = excluded.travel_end_date,
                global_unavailable = excluded.global_unavailable,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(admin_username)
        .bind(&update.primary_time_zone)
        .bind(update.travel_mode_enabled)
        .bind(&update.travel_time_zone)
        .bind(update.travel_start_date)
        .bind(update.travel_end_date)
        .bind(update.global_unavailable)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Self::find_by_admin(pool, admin_username)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Schedule settings for {} not found", admin_username))
            })
    }

    /// Set a new primary timezone for the admin and propagate it to every
    /// meeting type's default zone. Both writes share one transaction; the
    /// settings zone and the meeting-type defaults can never be observed
    /// disagreeing.
    pub async fn bulk_update_time_zone(
        pool: &SqlitePool,
        admin_username: &str,
        time_zone: &str,
    ) -> AppResult<u64> {
        let now = Utc::now().naive_utc();

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO schedule_settings (
                admin_username, primary_time_zone, travel_mode_enabled,
                global_unavailable, created_at, updated_at
            )
            VALUES (?, ?, 0, 0, ?, ?)
            ON CONFLICT(admin_username) DO UPDATE SET
                primary_time_zone = excluded.primary_time_zone,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(admin_username)
        .bind(time_zone)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let updated =
            MeetingTypeRepository::update_time_zone_for_admin(&mut *tx, admin_username, time_zone)
                .await?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Updated timezone to {} for admin {} ({} meeting types)",
            time_zone,
            admin_username,
            updated
        );

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool() -> SqlitePool {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn bulk_time_zone_update_keeps_settings_and_types_in_step() {
        let pool = pool().await;
        MeetingTypeRepository::get_or_create_default(&pool, "admin")
            .await
            .unwrap();

        let updated =
            ScheduleSettingsRepository::bulk_update_time_zone(&pool, "admin", "Europe/Berlin")
                .await
                .unwrap();
        assert_eq!(updated, 1);

        let settings = ScheduleSettingsRepository::find_by_admin(&pool, "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settings.primary_time_zone.as_deref(), Some("Europe/Berlin"));

        let types = crate::db::MeetingTypeRepository::list_by_admin(&pool, "admin")
            .await
            .unwrap();
        assert!(types.iter().all(|t| t.time_zone == "Europe/Berlin"));
    }

    #[tokio::test]
    async fn bulk_time_zone_update_with_no_meeting_types_still_writes_settings() {
        let pool = pool().await;

        let updated =
            ScheduleSettingsRepository::bulk_update_time_zone(&pool, "admin", "Asia/Tokyo")
                .await
                .unwrap();
        assert_eq!(updated, 0);

        let settings = ScheduleSettingsRepository::find_by_admin(&pool, "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settings.primary_time_zone.as_deref(), Some("Asia/Tokyo"));
    }
}
