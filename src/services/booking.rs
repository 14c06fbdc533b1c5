use std::sync::Arc;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{
    Booking, CalendarAvailabilityResponse, CheckAvailabilityRequest, CheckAvailabilityResponse,
    CreateBookingRequest, GuestInfo, RoomType, ServiceRecord, UpdateBookingRequest,
};
use crate::services::availability::{calendar_window_days, clamp_months, compute_calendar};
use crate::services::conflicts;
use crate::services::email::Notifier;
use crate::services::mapper::{self, DEFAULT_STATUS};
use crate::services::provider::AppointmentsProvider;

pub const DEFAULT_CAPACITY: u32 = 2;
pub const DEFAULT_AMENITIES: [&str; 3] = ["WiFi", "TV", "AC"];
pub const FALLBACK_ID_PREFIX: &str = "BK";
pub const MAX_STAY_NIGHTS: i32 = 365;

/// Entry point for the booking API.
///
/// Holds no state of its own: every call reads through to the provider.
pub struct BookingOrchestrator {
    provider: Arc<dyn AppointmentsProvider>,
    notifier: Arc<dyn Notifier>,
    config: AppConfig,
}

impl BookingOrchestrator {
    pub fn new(
        provider: Arc<dyn AppointmentsProvider>,
        notifier: Arc<dyn Notifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            provider,
            notifier,
            config,
        }
    }

    fn business_id(&self) -> Option<&str> {
        let id = self.config.bookings_business_id.trim();
        if id.is_empty() {
            tracing::warn!("booking business id not configured");
            None
        } else {
            Some(id)
        }
    }

    fn require_business_id(&self) -> Result<&str, AppError> {
        self.business_id()
            .ok_or_else(|| AppError::Config("Booking Business ID not configured".to_string()))
    }

    fn staff_id(&self) -> Option<&str> {
        Some(self.config.bookings_staff_id.trim()).filter(|id| !id.is_empty())
    }

    /// Catalog entry for `service_id`, or `None` if it is missing or the
    /// catalog cannot be read.
    async fn find_service(&self, business_id: &str, service_id: &str) -> Option<ServiceRecord> {
        match self.provider.list_services(business_id).await {
            Ok(services) => services
                .into_iter()
                .find(|s| s.id.as_deref() == Some(service_id)),
            Err(e) => {
                tracing::warn!(service_id, error = %e, "could not resolve room price from catalog");
                None
            }
        }
    }

    fn price_of(service: Option<&ServiceRecord>, fallback: Decimal) -> Decimal {
        service
            .and_then(|s| s.default_price)
            .map(|p| p.max(Decimal::ZERO))
            .unwrap_or(fallback)
    }

    fn room_type(&self, service: ServiceRecord) -> RoomType {
        let price = Self::price_of(Some(&service), self.config.fallback_nightly_price);
        RoomType {
            id: service.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            name: service.display_name.unwrap_or_else(|| "Room".to_string()),
            description: service.description.unwrap_or_default(),
            price,
            capacity: DEFAULT_CAPACITY,
            amenities: DEFAULT_AMENITIES.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub async fn list_room_types(&self) -> Vec<RoomType> {
        let Some(business_id) = self.business_id() else {
            return Vec::new();
        };

        match self.provider.list_services(business_id).await {
            Ok(services) => services.into_iter().map(|s| self.room_type(s)).collect(),
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch room types");
                Vec::new()
            }
        }
    }

    pub async fn get_calendar(
        &self,
        service_id: &str,
        months: Option<i32>,
    ) -> CalendarAvailabilityResponse {
        let mut response = CalendarAvailabilityResponse::empty(service_id);
        let Some(business_id) = self.business_id() else {
            return response;
        };

        let appointments = match self
            .provider
            .list_appointments(business_id, Some(service_id))
            .await
        {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::error!(service_id, error = %e, "failed to fetch calendar appointments");
                return response;
            }
        };

        let service = self.find_service(business_id, service_id).await;
        let price = Self::price_of(service.as_ref(), self.config.fallback_nightly_price);

        let today = Utc::now().date_naive();
        let window_days = calendar_window_days(today, clamp_months(months));
        response.days = compute_calendar(service_id, &appointments, price, today, window_days);
        response
    }

    pub async fn check_availability(
        &self,
        request: &CheckAvailabilityRequest,
    ) -> Result<CheckAvailabilityResponse, AppError> {
        if request.room_type.trim().is_empty() {
            return Err(AppError::Validation("Room type is required".to_string()));
        }
        validate_stay(request.check_in_date, request.duration_nights)?;

        let mut response = CheckAvailabilityResponse {
            available: false,
            message: "Booking is currently unavailable".to_string(),
            room_type: request.room_type.clone(),
            check_in_date: request.check_in_date,
            price: self.config.availability_fallback_price,
        };
        let Some(business_id) = self.business_id() else {
            return Ok(response);
        };

        let existing = match self
            .provider
            .list_appointments(business_id, Some(&request.room_type))
            .await
        {
            Ok(existing) => existing,
            Err(e) if self.config.fail_open_on_availability_error => {
                tracing::warn!(
                    room_type = %request.room_type,
                    error = %e,
                    "availability check failed, reporting available"
                );
                response.available = true;
                response.message = "Room is available for the selected dates".to_string();
                return Ok(response);
            }
            Err(e) => return Err(AppError::Provider(e)),
        };

        let service = self.find_service(business_id, &request.room_type).await;
        response.price = Self::price_of(service.as_ref(), self.config.availability_fallback_price);
        response.available = conflicts::is_available(
            &request.room_type,
            request.check_in_date,
            request.duration_nights,
            &existing,
        );
        response.message = if response.available {
            "Room is available for the selected dates".to_string()
        } else {
            "Room is not available for the selected dates".to_string()
        };
        Ok(response)
    }

    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking, AppError> {
        validate_create(&request)?;
        let business_id = self.require_business_id()?;

        let service = self.find_service(business_id, &request.room_type).await;
        let nightly = Self::price_of(service.as_ref(), self.config.fallback_nightly_price);

        // Re-checked here because the client's availability check fails open.
        match self
            .provider
            .list_appointments(business_id, Some(&request.room_type))
            .await
        {
            Ok(existing) => {
                if let Some(conflict) = conflicts::first_conflict(
                    &request.room_type,
                    request.check_in_date,
                    request.duration_nights,
                    &existing,
                ) {
                    tracing::info!(
                        room_type = %request.room_type,
                        conflicting_id = conflict.id.as_deref().unwrap_or("<none>"),
                        "rejecting booking for taken dates"
                    );
                    return Err(AppError::Conflict(
                        "The selected dates are no longer available".to_string(),
                    ));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not re-check availability, creating booking anyway");
            }
        }

        let now = Utc::now();
        let mut booking = Booking {
            booking_id: String::new(),
            room_name: service
                .and_then(|s| s.display_name)
                .unwrap_or_else(|| request.room_type.clone()),
            room_type: request.room_type,
            check_in_date: request.check_in_date,
            duration_nights: request.duration_nights,
            customer_info: request.customer_info,
            total_price: nightly * Decimal::from(request.duration_nights),
            status: DEFAULT_STATUS.to_string(),
            created_at: now,
        };

        let payload = mapper::to_appointment_payload(&booking, self.staff_id());
        match self.provider.create_appointment(business_id, &payload).await {
            Ok(created) => {
                booking.booking_id = created
                    .id
                    .filter(|id| !id.is_empty())
                    .unwrap_or_else(|| generate_booking_id(now));
                tracing::info!(booking_id = %booking.booking_id, "booking created");
            }
            Err(e) if self.config.fallback_booking_on_create_error => {
                booking.booking_id = generate_booking_id(now);
                tracing::error!(
                    booking_id = %booking.booking_id,
                    room_type = %booking.room_type,
                    check_in = %booking.check_in_date,
                    error = %e,
                    "provider rejected booking; returning a local booking that does not exist in Bookings"
                );
            }
            Err(e) => return Err(AppError::Provider(e)),
        }

        if let Err(e) = self.notifier.send_booking_confirmation(&booking).await {
            tracing::warn!(booking_id = %booking.booking_id, error = %e, "failed to send confirmation e-mail");
        }

        Ok(booking)
    }

    /// Most recent check-in first.
    pub async fn list_bookings(&self) -> Vec<Booking> {
        let Some(business_id) = self.business_id() else {
            return Vec::new();
        };

        let appointments = match self.provider.list_appointments(business_id, None).await {
            Ok(appointments) => appointments,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch bookings");
                return Vec::new();
            }
        };

        let mut bookings: Vec<Booking> = appointments.iter().map(mapper::to_booking).collect();
        bookings.sort_by(|a, b| b.check_in_date.cmp(&a.check_in_date));
        bookings
    }

    pub async fn get_booking(&self, booking_id: &str) -> Option<Booking> {
        if booking_id.trim().is_empty() {
            return None;
        }
        let business_id = self.business_id()?;

        match self.provider.get_appointment(business_id, booking_id).await {
            Ok(appointment) => appointment.as_ref().map(mapper::to_booking),
            Err(e) => {
                tracing::error!(booking_id, error = %e, "failed to fetch booking");
                None
            }
        }
    }

    pub async fn update_booking(&self, request: UpdateBookingRequest) -> Result<Booking, AppError> {
        if request.booking_id.trim().is_empty() {
            return Err(AppError::Validation("BookingId is required".to_string()));
        }
        validate_stay(request.check_in_date, request.duration_nights)?;
        let business_id = self.require_business_id()?;

        let draft = Booking {
            booking_id: request.booking_id.clone(),
            room_name: request.room_type.clone(),
            room_type: request.room_type,
            check_in_date: request.check_in_date,
            duration_nights: request.duration_nights,
            customer_info: request.customer_info,
            total_price: Decimal::ZERO,
            status: DEFAULT_STATUS.to_string(),
            created_at: Utc::now(),
        };
        let payload = mapper::to_appointment_payload(&draft, None);

        self.provider
            .patch_appointment(business_id, &request.booking_id, &payload)
            .await?;

        let updated = self
            .provider
            .get_appointment(business_id, &request.booking_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("booking {}", request.booking_id)))?;

        tracing::info!(booking_id = %request.booking_id, "booking updated");
        Ok(mapper::to_booking(&updated))
    }

    /// `Ok(false)` when the provider refused or could not be reached.
    pub async fn delete_booking(&self, booking_id: &str) -> Result<bool, AppError> {
        let business_id = self.require_business_id()?;

        match self.provider.delete_appointment(business_id, booking_id).await {
            Ok(()) => {
                tracing::info!(booking_id, "booking deleted");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(booking_id, error = %e, "failed to delete booking");
                Ok(false)
            }
        }
    }
}

fn validate_create(request: &CreateBookingRequest) -> Result<(), AppError> {
    if request.room_type.trim().is_empty() {
        return Err(AppError::Validation(
            "Room type and customer information required".to_string(),
        ));
    }
    let GuestInfo {
        first_name,
        last_name,
        email,
        ..
    } = &request.customer_info;
    if first_name.trim().is_empty() || last_name.trim().is_empty() || email.trim().is_empty() {
        return Err(AppError::Validation(
            "First name, last name, and email are required".to_string(),
        ));
    }
    validate_stay(request.check_in_date, request.duration_nights)
}

fn validate_stay(check_in: NaiveDate, nights: i32) -> Result<(), AppError> {
    if nights < 1 {
        return Err(AppError::Validation(
            "Duration must be at least one night".to_string(),
        ));
    }
    if nights > MAX_STAY_NIGHTS {
        return Err(AppError::Validation(format!(
            "Duration cannot exceed {MAX_STAY_NIGHTS} nights"
        )));
    }
    if check_in.checked_add_days(Days::new(nights as u64)).is_none() {
        return Err(AppError::Validation(
            "Check-in date is out of range".to_string(),
        ));
    }
    Ok(())
}

/// `BK-<yyyyMMddHHmmss>-<8 uppercase hex>`, for bookings the provider never
/// acknowledged.
pub fn generate_booking_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
    format!("{FALLBACK_ID_PREFIX}-{}-{suffix}", now.format("%Y%m%d%H%M%S"))
}
