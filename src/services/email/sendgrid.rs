use anyhow::Context;
use async_trait::async_trait;
use serde_json::json;

use super::{render_confirmation, Notifier};
use crate::models::Booking;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridNotifier {
    api_key: String,
    from_email: String,
    url: String,
    client: reqwest::Client,
}

impl SendGridNotifier {
    pub fn new(api_key: String, from_email: String) -> Self {
        Self::with_url(api_key, from_email, SENDGRID_URL.to_string())
    }

    pub fn with_url(api_key: String, from_email: String, url: String) -> Self {
        Self {
            api_key,
            from_email,
            url,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn send_booking_confirmation(&self, booking: &Booking) -> anyhow::Result<()> {
        if self.api_key.is_empty() || self.from_email.is_empty() {
            tracing::warn!("SendGrid is not configured, skipping confirmation e-mail");
            return Ok(());
        }
        let guest = &booking.customer_info;
        if guest.email.is_empty() {
            tracing::warn!(booking_id = %booking.booking_id, "guest has no e-mail address");
            return Ok(());
        }

        let name = format!("{} {}", guest.first_name, guest.last_name);
        let body = json!({
            "personalizations": [{
                "to": [{
                    "email": guest.email,
                    "name": name.trim(),
                }],
            }],
            "from": {"email": self.from_email, "name": "Hotel Booking System"},
            "subject": format!("Booking Confirmation - ID: {}", booking.booking_id),
            "content": [{"type": "text/html", "value": render_confirmation(booking)}],
        });

        self.client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("failed to send SendGrid e-mail")?
            .error_for_status()
            .context("SendGrid API returned error")?;

        tracing::info!(booking_id = %booking.booking_id, "confirmation e-mail sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GuestInfo;
    use chrono::{NaiveDate, Utc};
    use mockito::Matcher;
    use rust_decimal::Decimal;

    fn booking() -> Booking {
        Booking {
            booking_id: "BK-9".to_string(),
            room_type: "standard".to_string(),
            room_name: "Standard".to_string(),
            check_in_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            duration_nights: 1,
            customer_info: GuestInfo {
                first_name: "Ada".to_string(),
                last_name: "Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                ..Default::default()
            },
            total_price: Decimal::from(100),
            status: "Confirmed".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_sends_confirmation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v3/mail/send")
            .match_header("authorization", "Bearer sg-key")
            .match_body(Matcher::PartialJson(json!({
                "subject": "Booking Confirmation - ID: BK-9",
                "personalizations": [{"to": [{"email": "ada@example.com", "name": "Ada Lovelace"}]}],
            })))
            .with_status(202)
            .expect(1)
            .create_async()
            .await;

        let notifier = SendGridNotifier::with_url(
            "sg-key".to_string(),
            "front-desk@hotel.example".to_string(),
            format!("{}/v3/mail/send", server.url()),
        );
        notifier.send_booking_confirmation(&booking()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unconfigured_is_skipped() {
        let notifier = SendGridNotifier::with_url(
            String::new(),
            String::new(),
            "http://127.0.0.1:9/unused".to_string(),
        );
        assert!(notifier.send_booking_confirmation(&booking()).await.is_ok());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v3/mail/send")
            .with_status(401)
            .create_async()
            .await;

        let notifier = SendGridNotifier::with_url(
            "bad-key".to_string(),
            "front-desk@hotel.example".to_string(),
            format!("{}/v3/mail/send", server.url()),
        );
        assert!(notifier.send_booking_confirmation(&booking()).await.is_err());
    }
}
