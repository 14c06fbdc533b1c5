use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::date_range::{parse_utc_timestamp, DateRange};

pub const CUSTOMER_ODATA_TYPE: &str = "#microsoft.graph.bookingCustomerInformation";

/// Graph `dateTimeTimeZone` pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateTimeTimeZone {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl DateTimeTimeZone {
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(at.format("%Y-%m-%dT%H:%M:%S").to_string()),
            time_zone: Some("UTC".to_string()),
        }
    }

    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        self.date_time.as_deref().and_then(parse_utc_timestamp)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    #[serde(
        rename = "@odata.type",
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub odata_type: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Everything else the provider sends for the customer, `notes` included.
    #[serde(flatten)]
    pub additional_data: Map<String, Value>,
}

/// A Bookings appointment as it travels over the wire.
///
/// Every field is optional and a field of the wrong JSON type decodes as
/// absent, so one odd record never fails a whole listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start_date_time: Option<DateTimeTimeZone>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end_date_time: Option<DateTimeTimeZone>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<CustomerRecord>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub staff_member_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub is_location_online: Option<bool>,
}

impl AppointmentRecord {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start_date_time.as_ref().and_then(DateTimeTimeZone::to_utc)
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end_date_time.as_ref().and_then(DateTimeTimeZone::to_utc)
    }

    /// `None` unless both ends parse.
    pub fn stay_range(&self) -> Option<DateRange> {
        Some(DateRange::from_timestamps(self.start()?, self.end()?))
    }

    pub fn is_for_service(&self, service_id: &str) -> bool {
        self.service_id.as_deref() == Some(service_id)
    }

    pub fn first_customer(&self) -> Option<&CustomerRecord> {
        self.customers.as_deref().and_then(|c| c.first())
    }
}

/// Graph `bookingService`, the catalog entry behind a room type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub default_price: Option<Decimal>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}
