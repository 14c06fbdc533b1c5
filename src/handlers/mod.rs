pub mod bookings;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/bookings/room-types", get(bookings::room_types))
        .route(
            "/api/bookings/calendar/:room_type",
            get(bookings::calendar),
        )
        .route(
            "/api/bookings/check-availability",
            post(bookings::check_availability),
        )
        .route("/api/bookings/create", post(bookings::create_booking))
        .route("/api/bookings", get(bookings::list_bookings))
        .route(
            "/api/bookings/:id",
            get(bookings::get_booking)
                .put(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .with_state(state)
}
