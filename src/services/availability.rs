use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{AppointmentRecord, CalendarDay};

pub const DEFAULT_CALENDAR_MONTHS: u32 = 3;
pub const MAX_CALENDAR_MONTHS: u32 = 12;

/// One day per date from `window_start` through `window_start + window_days`,
/// both ends included, priced flat at `nightly_price`.
pub fn compute_calendar(
    service_id: &str,
    appointments: &[AppointmentRecord],
    nightly_price: Decimal,
    window_start: NaiveDate,
    window_days: u32,
) -> Vec<CalendarDay> {
    let booked = booked_dates(service_id, appointments);

    window_start
        .iter_days()
        .take(window_days as usize + 1)
        .map(|date| CalendarDay {
            date,
            is_available: !booked.contains(&date),
            price: nightly_price,
        })
        .collect()
}

/// Every night covered by an appointment of `service_id`. The checkout day is
/// not included.
pub fn booked_dates(service_id: &str, appointments: &[AppointmentRecord]) -> HashSet<NaiveDate> {
    let mut booked = HashSet::new();

    for appointment in appointments.iter().filter(|a| a.is_for_service(service_id)) {
        match appointment.stay_range() {
            Some(range) => booked.extend(range.days()),
            None => {
                tracing::warn!(
                    appointment_id = appointment.id.as_deref().unwrap_or("<none>"),
                    service_id,
                    "skipping appointment with unreadable dates in calendar"
                );
            }
        }
    }

    booked
}

/// Month counts outside `1..=12` fall back to three months.
pub fn clamp_months(months: Option<i32>) -> u32 {
    match months {
        Some(m) if (1..=MAX_CALENDAR_MONTHS as i32).contains(&m) => m as u32,
        _ => DEFAULT_CALENDAR_MONTHS,
    }
}

/// Returns the number of days after `today` that the window spans.
pub fn calendar_window_days(today: NaiveDate, months: u32) -> u32 {
    let end = today
        .checked_add_months(Months::new(months))
        .unwrap_or(today);
    (end - today).num_days().max(0) as u32
}
