use crate::config::AppConfig;
use crate::services::booking::BookingOrchestrator;

pub struct AppState {
    pub config: AppConfig,
    pub bookings: BookingOrchestrator,
}
