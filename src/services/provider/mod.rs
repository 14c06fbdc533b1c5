pub mod graph;

use async_trait::async_trait;

use crate::models::{AppointmentRecord, ServiceRecord};

/// System of record for the service catalog and appointments.
#[async_trait]
pub trait AppointmentsProvider: Send + Sync {
    async fn list_services(&self, business_id: &str) -> anyhow::Result<Vec<ServiceRecord>>;

    /// `service_id` narrows the listing server-side.
    async fn list_appointments(
        &self,
        business_id: &str,
        service_id: Option<&str>,
    ) -> anyhow::Result<Vec<AppointmentRecord>>;

    async fn get_appointment(
        &self,
        business_id: &str,
        appointment_id: &str,
    ) -> anyhow::Result<Option<AppointmentRecord>>;

    async fn create_appointment(
        &self,
        business_id: &str,
        payload: &AppointmentRecord,
    ) -> anyhow::Result<AppointmentRecord>;

    async fn patch_appointment(
        &self,
        business_id: &str,
        appointment_id: &str,
        payload: &AppointmentRecord,
    ) -> anyhow::Result<()>;

    async fn delete_appointment(&self, business_id: &str, appointment_id: &str) -> anyhow::Result<()>;
}
