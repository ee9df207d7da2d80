use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::{ScheduleSettings, UpsertScheduleSettings};
use crate::db::ScheduleSettingsRepository;
use crate::error::{AppError, AppResult};
use crate::routes::auth::AdminAuth;
use crate::scheduling::timezone::parse_time_zone;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_settings).put(update_settings))
        .route("/time-zone", put(bulk_update_time_zone))
}

#[derive(Debug, Deserialize)]
pub struct BulkTimeZoneRequest {
    pub time_zone: String,
}

/// Get the admin's schedule settings; absence of a row is a legitimate
/// "defaults" state, returned as null.
async fn get_settings(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
) -> AppResult<Json<Option<ScheduleSettings>>> {
    let settings = ScheduleSettingsRepository::find_by_admin(&state.db, &admin).await?;
    Ok(Json(settings))
}

/// Create or update the admin's schedule settings.
async fn update_settings(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Json(payload): Json<UpsertScheduleSettings>,
) -> AppResult<Json<ScheduleSettings>> {
    if let Some(ref zone) = payload.primary_time_zone {
        parse_time_zone(zone)
            .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", zone)))?;
    }
    if let Some(ref zone) = payload.travel_time_zone {
        parse_time_zone(zone)
            .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", zone)))?;
    }

    let settings = ScheduleSettingsRepository::upsert(&state.db, &admin, payload).await?;
    Ok(Json(settings))
}

/// Set a new primary timezone and propagate it to every meeting type.
async fn bulk_update_time_zone(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Json(request): Json<BulkTimeZoneRequest>,
) -> AppResult<Json<Value>> {
    parse_time_zone(&request.time_zone)
        .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", request.time_zone)))?;

    let updated =
        ScheduleSettingsRepository::bulk_update_time_zone(&state.db, &admin, &request.time_zone)
            .await?;

    Ok(Json(json!({
        "time_zone": request.time_zone,
        "meeting_types_updated": updated,
    })))
}
