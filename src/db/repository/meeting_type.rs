use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{availability_mode, MeetingType, UpsertMeetingType};
use crate::error::{AppError, AppResult};

/// Repository for meeting templates (`meeting_types` table).
pub struct MeetingTypeRepository;

impl MeetingTypeRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<MeetingType>> {
        let row = sqlx::query_as::<_, MeetingType>("SELECT * FROM meeting_types WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> AppResult<Option<MeetingType>> {
        let row = sqlx::query_as::<_, MeetingType>("SELECT * FROM meeting_types WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(row)
    }

    pub async fn list_by_admin(
        pool: &SqlitePool,
        admin_username: &str,
    ) -> AppResult<Vec<MeetingType>> {
        let rows = sqlx::query_as::<_, MeetingType>(
            "SELECT * FROM meeting_types WHERE admin_username = ? ORDER BY created_at",
        )
        .bind(admin_username)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(rows)
    }

    /// Fetch the admin's meeting types, provisioning the default "Intro Call"
    /// template on first access.
    pub async fn get_or_create_default(
        pool: &SqlitePool,
        admin_username: &str,
    ) -> AppResult<Vec<MeetingType>> {
        let existing = Self::list_by_admin(pool, admin_username).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let mut tx = pool.begin().await.map_err(AppError::Database)?;
        let slug = Self::unique_slug(&mut *tx, "intro-call", None).await?;

        sqlx::query(
            r#"
            INSERT INTO meeting_types (
                id, slug, admin_username, title, description,
                duration_minutes, buffer_before_minutes, buffer_after_minutes,
                min_notice_minutes, max_horizon_days, time_zone,
                availability_mode, busy_hide_percent, busy_pattern_version,
                daily_limit, show_header, no_overnight_slots,
                allow_public_reschedule, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&slug)
        .bind(admin_username)
        .bind("Intro Call")
        .bind(None::<String>)
        .bind(30i64)
        .bind(5i64)
        .bind(5i64)
        .bind(120i64)
        .bind(30i64)
        .bind("America/Los_Angeles")
        .bind(availability_mode::ALL)
        .bind(50i64)
        .bind(1i64)
        .bind(0i64)
        .bind(false)
        .bind(false)
        .bind(true)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        tx.commit().await.map_err(AppError::Database)?;

        tracing::info!(
            "Provisioned default meeting type '{}' for admin {}",
            slug,
            admin_username
        );

        Self::list_by_admin(pool, admin_username).await
    }

    /// Create or update a meeting type, preserving the id on update and
    /// resolving slug collisions by appending a numeric suffix.
    ///
    /// Returns the stored row (its slug may differ from the requested one).
    pub async fn upsert(
        pool: &SqlitePool,
        admin_username: &str,
        payload: UpsertMeetingType,
    ) -> AppResult<MeetingType> {
        validate_payload(&payload)?;

        let busy_hide_percent = payload.busy_hide_percent.clamp(10, 90);
        let now = Utc::now().naive_utc();

        match payload.id {
            Some(ref id) => {
                // Ownership check before updating in place.
                let existing = Self::find_by_id(pool, id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Meeting type {} not found", id)))?;
                if existing.admin_username != admin_username {
                    return Err(AppError::Forbidden);
                }

                // Slug probe and write share a transaction so a concurrent
                // upsert cannot slip between them and trip the UNIQUE
                // constraint.
                let mut tx = pool.begin().await.map_err(AppError::Database)?;
                let slug = Self::unique_slug(&mut *tx, &payload.slug, Some(id)).await?;

                sqlx::query(
                    r#"
                    UPDATE meeting_types SET
                        slug = ?, title = ?, description = ?,
                        duration_minutes = ?, buffer_before_minutes = ?, buffer_after_minutes = ?,
                        min_notice_minutes = ?, max_horizon_days = ?, time_zone = ?,
                        availability_mode = ?, busy_hide_percent = ?, busy_pattern_version = ?,
                        daily_limit = ?, show_header = ?, no_overnight_slots = ?,
                        allow_public_reschedule = ?, updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&slug)
                .bind(&payload.title)
                .bind(&payload.description)
                .bind(payload.duration_minutes)
                .bind(payload.buffer_before_minutes)
                .bind(payload.buffer_after_minutes)
                .bind(payload.min_notice_minutes)
                .bind(payload.max_horizon_days)
                .bind(&payload.time_zone)
                .bind(&payload.availability_mode)
                .bind(busy_hide_percent)
                .bind(payload.busy_pattern_version)
                .bind(payload.daily_limit)
                .bind(payload.show_header)
                .bind(payload.no_overnight_slots)
                .bind(payload.allow_public_reschedule)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

                tx.commit().await.map_err(AppError::Database)?;

                Self::find_by_id(pool, id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Meeting type {} not found", id)))
            }
            None => {
                let id = Uuid::new_v4().to_string();

                let mut tx = pool.begin().await.map_err(AppError::Database)?;
                let slug = Self::unique_slug(&mut *tx, &payload.slug, None).await?;

                sqlx::query(
                    r#"
                    INSERT INTO meeting_types (
                        id, slug, admin_username, title, description,
                        duration_minutes, buffer_before_minutes, buffer_after_minutes,
                        min_notice_minutes, max_horizon_days, time_zone,
                        availability_mode, busy_hide_percent, busy_pattern_version,
                        daily_limit, show_header, no_overnight_slots,
                        allow_public_reschedule, created_at, updated_at
                    )
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(&slug)
                .bind(admin_username)
                .bind(&payload.title)
                .bind(&payload.description)
                .bind(payload.duration_minutes)
                .bind(payload.buffer_before_minutes)
                .bind(payload.buffer_after_minutes)
                .bind(payload.min_notice_minutes)
                .bind(payload.max_horizon_days)
                .bind(&payload.time_zone)
                .bind(&payload.availability_mode)
                .bind(busy_hide_percent)
                .bind(payload.busy_pattern_version)
                .bind(payload.daily_limit)
                .bind(payload.show_header)
                .bind(payload.no_overnight_slots)
                .bind(payload.allow_public_reschedule)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;

                tx.commit().await.map_err(AppError::Database)?;

                Self::find_by_id(pool, &id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Meeting type {} not found", id)))
            }
        }
    }

    /// Delete a meeting type by (id, admin) pair. Returns whether a row was
    /// removed.
    pub async fn delete(pool: &SqlitePool, id: &str, admin_username: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM meeting_types WHERE id = ? AND admin_username = ?")
            .bind(id)
            .bind(admin_username)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Update every meeting type's default timezone for one admin. Runs on
    /// the caller's transaction so it commits (or rolls back) together with
    /// the settings-zone write.
    pub async fn update_time_zone_for_admin(
        conn: &mut sqlx::SqliteConnection,
        admin_username: &str,
        time_zone: &str,
    ) -> AppResult<u64> {
        let now = Utc::now().naive_utc();
        let result = sqlx::query(
            "UPDATE meeting_types SET time_zone = ?, updated_at = ? WHERE admin_username = ?",
        )
        .bind(time_zone)
        .bind(now)
        .bind(admin_username)
        .execute(&mut *conn)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    /// Resolve a unique slug, appending `-2`, `-3`, ... on collision.
    /// `exclude_id` lets an update keep its own slug. Runs on the same
    /// transaction as the write that claims the slug.
    async fn unique_slug(
        conn: &mut sqlx::SqliteConnection,
        base: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<String> {
        let mut candidate = base.to_string();
        let mut suffix = 2u32;

        loop {
            let taken: Option<(String,)> =
                sqlx::query_as("SELECT id FROM meeting_types WHERE slug = ?")
                    .bind(&candidate)
                    .fetch_optional(&mut *conn)
                    .await
                    .map_err(AppError::Database)?;

            match taken {
                Some((id,)) if Some(id.as_str()) != exclude_id => {
                    candidate = format!("{}-{}", base, suffix);
                    suffix += 1;
                }
                _ => return Ok(candidate),
            }
        }
    }
}

fn validate_payload(payload: &UpsertMeetingType) -> AppResult<()> {
    if payload.slug.is_empty()
        || !payload
            .slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::Validation(
            "Slug must be a non-empty URL-safe string".to_string(),
        ));
    }

    if payload.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "Duration must be positive".to_string(),
        ));
    }

    if payload.buffer_before_minutes < 0 || payload.buffer_after_minutes < 0 {
        return Err(AppError::Validation(
            "Buffers cannot be negative".to_string(),
        ));
    }

    match payload.availability_mode.as_str() {
        availability_mode::ALL | availability_mode::BUSY | availability_mode::DAILY_LIMIT => Ok(()),
        other => Err(AppError::Validation(format!(
            "Unknown availability mode: {}",
            other
        ))),
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

    fn payload(slug: &str) -> UpsertMeetingType {
        UpsertMeetingType {
            id: None,
            slug: slug.to_string(),
            title: "Coffee Chat".to_string(),
            description: None,
            duration_minutes: 30,
            buffer_before_minutes: 5,
            buffer_after_minutes: 5,
            min_notice_minutes: 0,
            max_horizon_days: 30,
            time_zone: "America/Los_Angeles".to_string(),
            availability_mode: availability_mode::ALL.to_string(),
            busy_hide_percent: 50,
            busy_pattern_version: 1,
            daily_limit: 0,
            show_header: false,
            no_overnight_slots: false,
            allow_public_reschedule: true,
        }
    }

    #[tokio::test]
    async fn slug_collisions_resolve_with_numeric_suffix() {
        let pool = pool().await;

        let first = MeetingTypeRepository::upsert(&pool, "admin", payload("coffee"))
            .await
            .unwrap();
        assert_eq!(first.slug, "coffee");

        let second = MeetingTypeRepository::upsert(&pool, "admin", payload("coffee"))
            .await
            .unwrap();
        assert_eq!(second.slug, "coffee-2");

        let third = MeetingTypeRepository::upsert(&pool, "admin", payload("coffee"))
            .await
            .unwrap();
        assert_eq!(third.slug, "coffee-3");
    }

    #[tokio::test]
    async fn update_keeps_its_own_slug_and_id() {
        let pool = pool().await;

        let created = MeetingTypeRepository::upsert(&pool, "admin", payload("coffee"))
            .await
            .unwrap();

        let mut update = payload("coffee");
        update.id = Some(created.id.clone());
        update.title = "Renamed".to_string();

        let updated = MeetingTypeRepository::upsert(&pool, "admin", update)
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.slug, "coffee");
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn default_provisioning_is_idempotent() {
        let pool = pool().await;

        let first = MeetingTypeRepository::get_or_create_default(&pool, "admin")
            .await
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].slug, "intro-call");
        assert_eq!(first[0].duration_minutes, 30);

        let second = MeetingTypeRepository::get_or_create_default(&pool, "admin")
            .await
            .unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, first[0].id);
    }
}
