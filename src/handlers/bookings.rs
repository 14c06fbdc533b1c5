use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::{
    Booking, CalendarAvailabilityResponse, CheckAvailabilityRequest, CheckAvailabilityResponse,
    CreateBookingRequest, UpdateBookingRequest,
};
use crate::state::AppState;

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if expected_token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

// GET /api/bookings/room-types
pub async fn room_types(State(state): State<Arc<AppState>>) -> Json<Value> {
    let rooms = state.bookings.list_room_types().await;
    Json(json!({ "roomTypes": rooms }))
}

// GET /api/bookings/calendar/:room_type?months=3
#[derive(Deserialize)]
pub struct CalendarQuery {
    pub months: Option<String>,
}

pub async fn calendar(
    State(state): State<Arc<AppState>>,
    Path(room_type): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarAvailabilityResponse> {
    // Unparseable values fall back to the default window.
    let months = query.months.and_then(|m| m.trim().parse().ok());
    Json(state.bookings.get_calendar(&room_type, months).await)
}

// POST /api/bookings/check-availability
pub async fn check_availability(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CheckAvailabilityRequest>,
) -> Result<Json<CheckAvailabilityResponse>, AppError> {
    state
        .bookings
        .check_availability(&body)
        .await
        .map(Json)
        .map_err(|e| e.or_generic("Could not check availability."))
}

// POST /api/bookings/create
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    state
        .bookings
        .create_booking(body)
        .await
        .map(Json)
        .map_err(|e| e.or_generic("Could not create booking. Please try again."))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<Vec<Booking>>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    Ok(Json(state.bookings.list_bookings().await))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    state
        .bookings
        .get_booking(&id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("booking {id}")))
}

// PUT /api/bookings/:id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut body): Json<UpdateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    body.booking_id = id;
    state
        .bookings
        .update_booking(body)
        .await
        .map(Json)
        .map_err(|e| e.or_generic("Could not update booking."))
}

// DELETE /api/bookings/:id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.admin_token)?;
    match state.bookings.delete_booking(&id).await {
        Ok(true) => Ok(StatusCode::NO_CONTENT),
        Ok(false) => Err(AppError::Failed("Unable to delete booking.")),
        Err(e) => Err(e.or_generic("Could not delete booking.")),
    }
}
