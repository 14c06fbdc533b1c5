use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};

use super::date_range::{add_nights, parse_utc_timestamp};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuestInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub booking_id: String,
    pub room_type: String,
    pub room_name: String,
    pub check_in_date: NaiveDate,
    pub duration_nights: i32,
    pub customer_info: GuestInfo,
    pub total_price: Decimal,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn check_out_date(&self) -> NaiveDate {
        add_nights(self.check_in_date, self.duration_nights)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityRequest {
    pub room_type: String,
    #[serde(deserialize_with = "check_in_date")]
    pub check_in_date: NaiveDate,
    #[serde(default = "one_night")]
    pub duration_nights: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[serde(default)]
    pub room_type: String,
    #[serde(deserialize_with = "check_in_date")]
    pub check_in_date: NaiveDate,
    #[serde(default = "one_night")]
    pub duration_nights: i32,
    #[serde(default)]
    pub customer_info: GuestInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    #[serde(default)]
    pub booking_id: String,
    #[serde(default)]
    pub room_type: String,
    #[serde(deserialize_with = "check_in_date")]
    pub check_in_date: NaiveDate,
    #[serde(default = "one_night")]
    pub duration_nights: i32,
    #[serde(default)]
    pub customer_info: GuestInfo,
}

fn one_night() -> i32 {
    1
}

/// The web client sends either a plain date or a full ISO timestamp.
fn check_in_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_utc_timestamp(&raw)
        .map(|ts| ts.date_naive())
        .ok_or_else(|| de::Error::custom(format!("invalid check-in date: {raw}")))
}
