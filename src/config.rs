use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub admin_token: String,
    pub bookings_business_id: String,
    pub bookings_staff_id: String,
    pub azure_tenant_id: String,
    pub azure_client_id: String,
    pub azure_client_secret: String,
    pub service_account_email: String,
    pub service_account_password: String,
    /// When set, used as-is instead of signing in as the service account.
    pub graph_access_token: String,
    pub graph_base_url: String,
    pub login_base_url: String,
    pub provider_timeout_secs: u64,
    /// Nightly price for rooms whose catalog entry has none, and for bookings
    /// created while the catalog is unreachable.
    pub fallback_nightly_price: Decimal,
    /// Price quoted by an availability check that could not reach the provider.
    pub availability_fallback_price: Decimal,
    pub fail_open_on_availability_error: bool,
    pub fallback_booking_on_create_error: bool,
    pub sendgrid_api_key: String,
    pub sendgrid_from_email: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            admin_token: "changeme".to_string(),
            bookings_business_id: String::new(),
            bookings_staff_id: String::new(),
            azure_tenant_id: String::new(),
            azure_client_id: String::new(),
            azure_client_secret: String::new(),
            service_account_email: String::new(),
            service_account_password: String::new(),
            graph_access_token: String::new(),
            graph_base_url: "https://graph.microsoft.com/v1.0".to_string(),
            login_base_url: "https://login.microsoftonline.com".to_string(),
            provider_timeout_secs: 15,
            fallback_nightly_price: Decimal::from(100),
            availability_fallback_price: Decimal::from(100),
            fail_open_on_availability_error: true,
            fallback_booking_on_create_error: true,
            sendgrid_api_key: String::new(),
            sendgrid_from_email: String::new(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: parsed("PORT").unwrap_or(defaults.port),
            admin_token: env::var("ADMIN_TOKEN").unwrap_or(defaults.admin_token),
            bookings_business_id: env::var("BOOKINGS_BUSINESS_ID").unwrap_or_default(),
            bookings_staff_id: env::var("BOOKINGS_STAFF_ID").unwrap_or_default(),
            azure_tenant_id: env::var("AZURE_TENANT_ID").unwrap_or_default(),
            azure_client_id: env::var("AZURE_CLIENT_ID").unwrap_or_default(),
            azure_client_secret: env::var("AZURE_CLIENT_SECRET").unwrap_or_default(),
            service_account_email: env::var("SERVICE_ACCOUNT_EMAIL").unwrap_or_default(),
            service_account_password: env::var("SERVICE_ACCOUNT_PASSWORD").unwrap_or_default(),
            graph_access_token: env::var("GRAPH_ACCESS_TOKEN").unwrap_or_default(),
            graph_base_url: env::var("GRAPH_BASE_URL").unwrap_or(defaults.graph_base_url),
            login_base_url: env::var("LOGIN_BASE_URL").unwrap_or(defaults.login_base_url),
            provider_timeout_secs: parsed("PROVIDER_TIMEOUT_SECS")
                .unwrap_or(defaults.provider_timeout_secs),
            fallback_nightly_price: parsed("FALLBACK_NIGHTLY_PRICE")
                .unwrap_or(defaults.fallback_nightly_price),
            availability_fallback_price: parsed("AVAILABILITY_FALLBACK_PRICE")
                .unwrap_or(defaults.availability_fallback_price),
            fail_open_on_availability_error: parsed("FAIL_OPEN_ON_AVAILABILITY_ERROR")
                .unwrap_or(defaults.fail_open_on_availability_error),
            fallback_booking_on_create_error: parsed("FALLBACK_BOOKING_ON_CREATE_ERROR")
                .unwrap_or(defaults.fallback_booking_on_create_error),
            sendgrid_api_key: env::var("SENDGRID_API_KEY").unwrap_or_default(),
            sendgrid_from_email: env::var("SENDGRID_FROM_EMAIL").unwrap_or_default(),
        }
    }
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
