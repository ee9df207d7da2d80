use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db::models::{
    Blackout, Booking, CreateBlackout, MeetingType, UpsertMeetingType, WeeklyAvailability,
    WeeklyBlackout, WeeklyWindow,
};
use crate::db::{
    AvailabilityRepository, BlackoutRepository, BookingRepository, MeetingTypeRepository,
};
use crate::error::{AppError, AppResult};
use crate::routes::auth::AdminAuth;
use crate::scheduling::timezone::parse_time_zone;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_meeting_types).put(upsert_meeting_type))
        .route("/:id", delete(delete_meeting_type))
        .route(
            "/:id/availability",
            get(get_weekly_availability).put(replace_weekly_availability),
        )
        .route(
            "/:id/weekly-blackouts",
            get(get_weekly_blackouts).put(replace_weekly_blackouts),
        )
        .route("/:id/blackouts", get(list_blackouts).post(create_blackout))
        .route("/:id/blackouts/:blackout_id", delete(delete_blackout))
        .route("/:id/bookings", get(list_bookings))
}

#[derive(Debug, Deserialize)]
pub struct ReplaceWindowsRequest {
    pub windows: Vec<WeeklyWindow>,
}

/// Load a meeting type and verify it belongs to the authenticated admin.
async fn load_owned(
    state: &Arc<AppState>,
    id: &str,
    admin_username: &str,
) -> AppResult<MeetingType> {
    let meeting_type = MeetingTypeRepository::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Meeting type {} not found", id)))?;

    if meeting_type.admin_username != admin_username {
        return Err(AppError::Forbidden);
    }

    Ok(meeting_type)
}

/// List the admin's meeting types, provisioning the default on first access.
async fn list_meeting_types(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
) -> AppResult<Json<Vec<MeetingType>>> {
    let types = MeetingTypeRepository::get_or_create_default(&state.db, &admin).await?;
    Ok(Json(types))
}

/// Create or update a meeting type; the stored slug may carry a numeric
/// suffix when the requested one collides.
async fn upsert_meeting_type(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Json(payload): Json<UpsertMeetingType>,
) -> AppResult<Json<MeetingType>> {
    // Reject unknown zones at the edge; the engine would otherwise surface
    // this as a data-integrity error on every slot request.
    parse_time_zone(&payload.time_zone)
        .map_err(|_| AppError::Validation(format!("Unknown timezone: {}", payload.time_zone)))?;

    let stored = MeetingTypeRepository::upsert(&state.db, &admin, payload).await?;
    Ok(Json(stored))
}

async fn delete_meeting_type(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    let removed = MeetingTypeRepository::delete(&state.db, &id, &admin).await?;
    if !removed {
        return Err(AppError::NotFound(format!("Meeting type {} not found", id)));
    }
    Ok(Json(json!({ "deleted": true })))
}

async fn get_weekly_availability(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<WeeklyAvailability>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows =
        AvailabilityRepository::find_weekly_availability(&state.db, &meeting_type.id).await?;
    Ok(Json(rows))
}

/// Full replace of the weekly availability windows.
async fn replace_weekly_availability(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
    Json(request): Json<ReplaceWindowsRequest>,
) -> AppResult<Json<Vec<WeeklyAvailability>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows = AvailabilityRepository::replace_weekly_availability(
        &state.db,
        &meeting_type.id,
        &request.windows,
    )
    .await?;
    Ok(Json(rows))
}

async fn get_weekly_blackouts(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<WeeklyBlackout>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows = AvailabilityRepository::find_weekly_blackouts(&state.db, &meeting_type.id).await?;
    Ok(Json(rows))
}

/// Full replace of the recurring weekly blackouts.
async fn replace_weekly_blackouts(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
    Json(request): Json<ReplaceWindowsRequest>,
) -> AppResult<Json<Vec<WeeklyBlackout>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows = AvailabilityRepository::replace_weekly_blackouts(
        &state.db,
        &meeting_type.id,
        &request.windows,
    )
    .await?;
    Ok(Json(rows))
}

async fn list_blackouts(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Blackout>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows = BlackoutRepository::find_by_meeting_type(&state.db, &meeting_type.id).await?;
    Ok(Json(rows))
}

async fn create_blackout(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
    Json(payload): Json<CreateBlackout>,
) -> AppResult<Json<Blackout>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let row = BlackoutRepository::insert(&state.db, &meeting_type.id, payload).await?;
    Ok(Json(row))
}

async fn delete_blackout(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path((id, blackout_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let removed = BlackoutRepository::delete(&state.db, &blackout_id, &meeting_type.id).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "Blackout {} not found",
            blackout_id
        )));
    }
    Ok(Json(json!({ "deleted": true })))
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    AdminAuth(admin): AdminAuth,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Booking>>> {
    let meeting_type = load_owned(&state, &id, &admin).await?;
    let rows = BookingRepository::find_by_meeting_type(&state.db, &meeting_type.id).await?;
    Ok(Json(rows))
}
