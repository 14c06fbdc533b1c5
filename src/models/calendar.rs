use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_available: bool,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarAvailabilityResponse {
    pub room_type: String,
    pub days: Vec<CalendarDay>,
    pub message: String,
}

impl CalendarAvailabilityResponse {
    pub fn empty(room_type: &str) -> Self {
        Self {
            room_type: room_type.to_string(),
            days: Vec::new(),
            message: "Calendar data retrieved successfully".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAvailabilityResponse {
    pub available: bool,
    pub message: String,
    pub room_type: String,
    pub check_in_date: NaiveDate,
    pub price: Decimal,
}
