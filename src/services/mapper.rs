use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::models::appointment::CUSTOMER_ODATA_TYPE;
use crate::models::date_range::{midnight_utc, parse_utc_timestamp};
use crate::models::{AppointmentRecord, Booking, CustomerRecord, DateTimeTimeZone, GuestInfo};

pub const DEFAULT_STATUS: &str = "Confirmed";

/// Projects a provider appointment onto a [`Booking`].
///
/// Total over its input: every missing or malformed field falls back to a
/// default so a single bad record cannot break a listing.
///
/// - start: now; end: start + 1 day
/// - duration: whole days between start and end, rounded, at least 1
/// - name: first token is the first name, the rest the last name
/// - price: 0; status: `Confirmed`; created at: the check-in instant
pub fn to_booking(appointment: &AppointmentRecord) -> Booking {
    let check_in = appointment.start().unwrap_or_else(Utc::now);
    let check_out = appointment
        .end()
        .unwrap_or_else(|| {
            check_in
                .checked_add_signed(Duration::days(1))
                .unwrap_or(check_in)
        });

    let customer = appointment.first_customer();
    let (first_name, last_name) = split_name(
        customer
            .and_then(|c| c.name.as_deref())
            .unwrap_or_default(),
    );

    let room_type = appointment.service_id.clone().unwrap_or_default();
    let room_name = appointment
        .service_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| room_type.clone());

    Booking {
        booking_id: appointment.id.clone().unwrap_or_default(),
        room_type,
        room_name,
        check_in_date: check_in.date_naive(),
        duration_nights: duration_nights(check_in, check_out),
        customer_info: GuestInfo {
            first_name,
            last_name,
            email: customer
                .and_then(|c| c.email_address.clone())
                .unwrap_or_default(),
            phone: customer.and_then(|c| c.phone.clone()).unwrap_or_default(),
            notes: customer.map(customer_notes).unwrap_or_default(),
        },
        total_price: appointment
            .price
            .map(|p| p.max(Decimal::ZERO))
            .unwrap_or(Decimal::ZERO),
        status: appointment
            .status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_STATUS)
            .to_string(),
        created_at: appointment
            .created_date_time
            .as_deref()
            .and_then(parse_utc_timestamp)
            .unwrap_or(check_in),
    }
}

/// Builds the appointment body for a create or a patch.
///
/// The stay runs from midnight UTC on the check-in date to midnight UTC on the
/// checkout date.
pub fn to_appointment_payload(booking: &Booking, staff_id: Option<&str>) -> AppointmentRecord {
    let start = midnight_utc(booking.check_in_date);
    let end = midnight_utc(booking.check_out_date());

    let guest = &booking.customer_info;
    let mut additional_data = Map::new();
    additional_data.insert("notes".to_string(), Value::String(guest.notes.clone()));

    AppointmentRecord {
        service_id: Some(booking.room_type.clone()),
        start_date_time: Some(DateTimeTimeZone::utc(start)),
        end_date_time: Some(DateTimeTimeZone::utc(end)),
        customers: Some(vec![CustomerRecord {
            odata_type: Some(CUSTOMER_ODATA_TYPE.to_string()),
            name: Some(join_name(&guest.first_name, &guest.last_name)),
            email_address: Some(guest.email.clone()),
            phone: Some(guest.phone.clone()),
            additional_data,
        }]),
        staff_member_ids: staff_id
            .filter(|id| !id.is_empty())
            .map(|id| vec![id.to_string()]),
        is_location_online: Some(false),
        ..Default::default()
    }
}

pub fn duration_nights(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i32 {
    let days = (check_out - check_in).num_seconds() as f64 / 86_400.0;
    (days.round() as i32).max(1)
}

pub fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

pub fn join_name(first: &str, last: &str) -> String {
    [first.trim(), last.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn customer_notes(customer: &CustomerRecord) -> String {
    match customer.additional_data.get("notes") {
        Some(Value::String(notes)) => notes.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
