pub mod sendgrid;

use async_trait::async_trait;

use crate::models::Booking;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_booking_confirmation(&self, booking: &Booking) -> anyhow::Result<()>;
}

/// Used when no mail service is configured.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn send_booking_confirmation(&self, booking: &Booking) -> anyhow::Result<()> {
        tracing::debug!(booking_id = %booking.booking_id, "e-mail disabled, not sending confirmation");
        Ok(())
    }
}

/// HTML body of the confirmation e-mail.
pub fn render_confirmation(booking: &Booking) -> String {
    let guest = &booking.customer_info;
    let check_in = booking.check_in_date.format("%B %d, %Y");
    let check_out = booking.check_out_date().format("%B %d, %Y");
    let notes = if guest.notes.trim().is_empty() {
        String::new()
    } else {
        format!("<p><strong>Notes:</strong> {}</p>\n", escape_html(&guest.notes))
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <body style=\"font-family: Arial, sans-serif; color: #333;\">\n\
         <h2>Booking Confirmed</h2>\n\
         <p>Dear {first} {last},</p>\n\
         <p>Thank you for your reservation. Your booking details are below.</p>\n\
         <p><strong>Booking ID:</strong> {id}</p>\n\
         <p><strong>Room:</strong> {room}</p>\n\
         <p><strong>Check-in:</strong> {check_in}</p>\n\
         <p><strong>Check-out:</strong> {check_out}</p>\n\
         <p><strong>Nights:</strong> {nights}</p>\n\
         <p><strong>Total:</strong> ${total}</p>\n\
         {notes}\
         </body>\n\
         </html>\n",
        first = escape_html(&guest.first_name),
        last = escape_html(&guest.last_name),
        id = escape_html(&booking.booking_id),
        room = escape_html(&booking.room_name),
        nights = booking.duration_nights,
        total = booking.total_price.round_dp(2),
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuestInfo;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn booking(notes: &str) -> Booking {
        Booking {
            booking_id: "BK-1".to_string(),
            room_type: "deluxe".to_string(),
            room_name: "Deluxe Suite".to_string(),
            check_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            duration_nights: 3,
            customer_info: GuestInfo {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: String::new(),
                notes: notes.to_string(),
            },
            total_price: dec!(450),
            status: "Confirmed".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_render_confirmation() {
        let html = render_confirmation(&booking("<b>late</b> arrival"));
        assert!(html.contains("Dear Ada Lovelace"));
        assert!(html.contains("<strong>Booking ID:</strong> BK-1"));
        assert!(html.contains("<strong>Check-in:</strong> March 01, 2025"));
        assert!(html.contains("<strong>Check-out:</strong> March 04, 2025"));
        assert!(html.contains("<strong>Nights:</strong> 3"));
        assert!(html.contains("$450"));
        assert!(html.contains("&lt;b&gt;late&lt;/b&gt; arrival"));
    }

    #[test]
    fn test_render_confirmation_without_notes() {
        let html = render_confirmation(&booking(""));
        assert!(!html.contains("Notes:"));
    }
}
