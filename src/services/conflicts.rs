use chrono::NaiveDate;

use crate::models::{AppointmentRecord, DateRange};

/// Returns the first appointment for `service_id` whose stay overlaps
/// `[check_in, check_in + nights)`.
///
/// Appointments whose dates cannot be read never conflict. That keeps a bad
/// record from blocking new bookings but can let a double booking through,
/// so each one is logged.
pub fn first_conflict<'a>(
    service_id: &str,
    check_in: NaiveDate,
    nights: i32,
    existing: &'a [AppointmentRecord],
) -> Option<&'a AppointmentRecord> {
    let candidate = DateRange::from_nights(check_in, nights);

    existing
        .iter()
        .filter(|appointment| appointment.is_for_service(service_id))
        .find(|appointment| match appointment.stay_range() {
            Some(range) => range.overlaps(&candidate),
            None => {
                tracing::warn!(
                    appointment_id = appointment.id.as_deref().unwrap_or("<none>"),
                    service_id,
                    "ignoring appointment with unreadable dates in conflict check"
                );
                false
            }
        })
}

pub fn is_available(
    service_id: &str,
    check_in: NaiveDate,
    nights: i32,
    existing: &[AppointmentRecord],
) -> bool {
    first_conflict(service_id, check_in, nights, existing).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stay(id: &str, service: &str, start: &str, end: &str) -> AppointmentRecord {
        serde_json::from_value(json!({
            "id": id,
            "serviceId": service,
            "startDateTime": {"dateTime": format!("{start}T00:00:00Z")},
            "endDateTime": {"dateTime": format!("{end}T00:00:00Z")},
        }))
        .unwrap()
    }

    #[test]
    fn test_no_existing_appointments() {
        assert!(is_available("standard", d("2025-03-01"), 3, &[]));
    }

    #[test]
    fn test_back_to_back_stays_are_allowed() {
        let existing = vec![stay("a", "standard", "2025-01-10", "2025-01-13")];
        assert!(is_available("standard", d("2025-01-13"), 2, &existing));

        let existing = vec![stay("b", "standard", "2025-01-13", "2025-01-15")];
        assert!(is_available("standard", d("2025-01-10"), 3, &existing));
    }

    #[test]
    fn test_overlapping_stay_conflicts() {
        let existing = vec![stay("a", "standard", "2025-01-10", "2025-01-13")];
        assert!(!is_available("standard", d("2025-01-12"), 2, &existing));
        let conflict = first_conflict("standard", d("2025-01-12"), 2, &existing).unwrap();
        assert_eq!(conflict.id.as_deref(), Some("a"));

        let existing = vec![stay("b", "standard", "2025-01-12", "2025-01-14")];
        assert!(!is_available("standard", d("2025-01-10"), 3, &existing));
    }

    #[test]
    fn test_other_service_does_not_conflict() {
        let existing = vec![stay("a", "deluxe", "2025-01-10", "2025-01-13")];
        assert!(is_available("standard", d("2025-01-11"), 1, &existing));
    }

    #[test]
    fn test_unreadable_existing_record_fails_open() {
        let broken: AppointmentRecord = serde_json::from_value(json!({
            "id": "broken",
            "serviceId": "standard",
            "startDateTime": {"dateTime": "???"},
            "endDateTime": {"dateTime": "2025-01-13T00:00:00Z"}
        }))
        .unwrap();
        assert!(is_available("standard", d("2025-01-11"), 1, &[broken]));
    }

    #[test]
    fn test_zero_nights_checks_a_single_night() {
        let existing = vec![stay("a", "standard", "2025-01-10", "2025-01-11")];
        assert!(!is_available("standard", d("2025-01-10"), 0, &existing));
        assert!(is_available("standard", d("2025-01-11"), 0, &existing));
    }
}
