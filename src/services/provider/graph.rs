use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::AppointmentsProvider;
use crate::models::{AppointmentRecord, ServiceRecord};
use crate::services::auth::TokenProvider;

const PREFER_UTC: &str = "outlook.timezone=\"UTC\"";

/// Microsoft Graph Bookings client.
pub struct GraphBookingsProvider {
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
    client: reqwest::Client,
}

/// Stops runaway `@odata.nextLink` chains.
const MAX_PAGES: usize = 100;

/// Elements stay raw so one malformed entry does not sink the page.
#[derive(Deserialize)]
struct Collection {
    #[serde(default)]
    value: Vec<serde_json::Value>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

impl GraphBookingsProvider {
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("invalid GRAPH_BASE_URL")?;
        anyhow::ensure!(!base_url.cannot_be_a_base(), "GRAPH_BASE_URL must be a base URL");

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build Graph HTTP client")?;

        Ok(Self {
            base_url,
            tokens,
            client,
        })
    }

    fn business_url(&self, business_id: &str, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["solutions", "bookingBusinesses", business_id])
                .extend(segments);
        }
        url
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&AppointmentRecord>,
    ) -> anyhow::Result<reqwest::Response> {
        let token = self
            .tokens
            .access_token()
            .await
            .context("failed to acquire Graph access token")?;

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header("Prefer", PREFER_UTC);
        if let Some(body) = body {
            request = request.json(body);
        }

        request
            .send()
            .await
            .context("failed to call Graph Bookings API")
    }

    async fn fetch_all<T: DeserializeOwned>(&self, first: Url) -> anyhow::Result<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(first);
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages == MAX_PAGES {
                tracing::warn!(pages, "Graph collection has more pages than allowed, truncating");
                break;
            }
            pages += 1;

            let resp = error_for_status(self.send(Method::GET, url, None).await?).await?;
            let page: Collection = resp
                .json()
                .await
                .context("failed to parse Graph collection")?;
            items.extend(decode_elements(page.value));
            next = page
                .next_link
                .map(|link| Url::parse(&link))
                .transpose()
                .context("invalid @odata.nextLink")?;
        }

        Ok(items)
    }
}

async fn error_for_status(resp: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    anyhow::bail!("Graph API error ({status}): {body}")
}

fn decode_elements<T: DeserializeOwned>(values: Vec<serde_json::Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping unreadable Graph collection element");
                None
            }
        })
        .collect()
}

/// OData string literals double their single quotes.
fn service_filter(service_id: &str) -> String {
    format!("serviceId eq '{}'", service_id.replace('\'', "''"))
}

#[async_trait]
impl AppointmentsProvider for GraphBookingsProvider {
    async fn list_services(&self, business_id: &str) -> anyhow::Result<Vec<ServiceRecord>> {
        self.fetch_all(self.business_url(business_id, &["services"]))
            .await
            .context("failed to list booking services")
    }

    async fn list_appointments(
        &self,
        business_id: &str,
        service_id: Option<&str>,
    ) -> anyhow::Result<Vec<AppointmentRecord>> {
        let mut url = self.business_url(business_id, &["appointments"]);
        if let Some(service_id) = service_id {
            url.query_pairs_mut()
                .append_pair("$filter", &service_filter(service_id));
        }
        self.fetch_all(url)
            .await
            .context("failed to list appointments")
    }

    async fn get_appointment(
        &self,
        business_id: &str,
        appointment_id: &str,
    ) -> anyhow::Result<Option<AppointmentRecord>> {
        let url = self.business_url(business_id, &["appointments", appointment_id]);
        let resp = self.send(Method::GET, url, None).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let appointment = error_for_status(resp)
            .await?
            .json()
            .await
            .context("failed to parse appointment")?;
        Ok(Some(appointment))
    }

    async fn create_appointment(
        &self,
        business_id: &str,
        payload: &AppointmentRecord,
    ) -> anyhow::Result<AppointmentRecord> {
        let url = self.business_url(business_id, &["appointments"]);
        error_for_status(self.send(Method::POST, url, Some(payload)).await?)
            .await
            .context("failed to create appointment")?
            .json()
            .await
            .context("failed to parse created appointment")
    }

    async fn patch_appointment(
        &self,
        business_id: &str,
        appointment_id: &str,
        payload: &AppointmentRecord,
    ) -> anyhow::Result<()> {
        let url = self.business_url(business_id, &["appointments", appointment_id]);
        error_for_status(self.send(Method::PATCH, url, Some(payload)).await?)
            .await
            .context("failed to update appointment")?;
        Ok(())
    }

    async fn delete_appointment(&self, business_id: &str, appointment_id: &str) -> anyhow::Result<()> {
        let url = self.business_url(business_id, &["appointments", appointment_id]);
        error_for_status(self.send(Method::DELETE, url, None).await?)
            .await
            .context("failed to delete appointment")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::StaticTokenProvider;
    use mockito::Matcher;

    fn provider(url: &str) -> GraphBookingsProvider {
        GraphBookingsProvider::new(
            url,
            Arc::new(StaticTokenProvider::new("graph-token".to_string())),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_services() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v1.0/solutions/bookingBusinesses/biz-1/services")
            .match_header("authorization", "Bearer graph-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"value":[{"id":"deluxe","displayName":"Deluxe Suite","description":"Sea view","defaultPrice":150.0}]}"#,
            )
            .create_async()
            .await;

        let graph = provider(&format!("{}/v1.0", server.url()));
        let services = graph.list_services("biz-1").await.unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].display_name.as_deref(), Some("Deluxe Suite"));
        assert_eq!(services[0].default_price, Some(rust_decimal::Decimal::from(150)));
    }

    #[tokio::test]
    async fn test_list_appointments_filters_and_follows_next_link() {
        let mut server = mockito::Server::new_async().await;
        let next = format!(
            "{}/v1.0/solutions/bookingBusinesses/biz-1/appointments?page=2",
            server.url()
        );
        let _first = server
            .mock("GET", "/v1.0/solutions/bookingBusinesses/biz-1/appointments")
            .match_query(Matcher::UrlEncoded(
                "$filter".into(),
                "serviceId eq 'deluxe'".into(),
            ))
            .match_header("prefer", PREFER_UTC)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"value":[{{"id":"a1","serviceId":"deluxe"}}],"@odata.nextLink":"{next}"}}"#
            ))
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/v1.0/solutions/bookingBusinesses/biz-1/appointments")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value":[{"id":"a2","serviceId":"deluxe"}]}"#)
            .create_async()
            .await;

        let graph = provider(&format!("{}/v1.0", server.url()));
        let appointments = graph
            .list_appointments("biz-1", Some("deluxe"))
            .await
            .unwrap();
        let ids: Vec<_> = appointments.iter().filter_map(|a| a.id.as_deref()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_get_missing_appointment_is_none() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/solutions/bookingBusinesses/biz-1/appointments/nope")
            .with_status(404)
            .with_body(r#"{"error":{"code":"ErrorItemNotFound"}}"#)
            .create_async()
            .await;

        let graph = provider(&server.url());
        assert!(graph.get_appointment("biz-1", "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_appointment_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/solutions/bookingBusinesses/biz-1/appointments")
            .match_body(Matcher::PartialJson(serde_json::json!({"serviceId": "standard"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"created-1","serviceId":"standard"}"#)
            .create_async()
            .await;

        let graph = provider(&server.url());
        let payload = AppointmentRecord {
            service_id: Some("standard".to_string()),
            ..Default::default()
        };
        let created = graph.create_appointment("biz-1", &payload).await.unwrap();
        assert_eq!(created.id.as_deref(), Some("created-1"));
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/solutions/bookingBusinesses/biz-1/appointments/a1")
            .with_status(503)
            .with_body("unavailable")
            .create_async()
            .await;

        let graph = provider(&server.url());
        let err = graph.delete_appointment("biz-1", "a1").await.unwrap_err();
        assert!(format!("{err:#}").contains("503"));
    }

    #[tokio::test]
    async fn test_patch_appointment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/solutions/bookingBusinesses/biz-1/appointments/a1")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;

        let graph = provider(&server.url());
        graph
            .patch_appointment("biz-1", "a1", &AppointmentRecord::default())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_skips_unreadable_elements() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/solutions/bookingBusinesses/biz-1/appointments")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"value":[{"id":"a1"},42,"junk",null,{"id":"a2"}]}"#)
            .create_async()
            .await;

        let graph = provider(&server.url());
        let appointments = graph.list_appointments("biz-1", None).await.unwrap();
        let ids: Vec<_> = appointments.iter().filter_map(|a| a.id.as_deref()).collect();
        assert_eq!(ids, vec!["a1", "a2"]);
    }

    #[tokio::test]
    async fn test_next_link_loop_is_capped() {
        let mut server = mockito::Server::new_async().await;
        let next = format!(
            "{}/solutions/bookingBusinesses/biz-1/services?page=again",
            server.url()
        );
        let mock = server
            .mock("GET", "/solutions/bookingBusinesses/biz-1/services")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(
                r#"{{"value":[{{"id":"standard"}}],"@odata.nextLink":"{next}"}}"#
            ))
            .expect(MAX_PAGES)
            .create_async()
            .await;

        let graph = provider(&server.url());
        let services = graph.list_services("biz-1").await.unwrap();
        assert_eq!(services.len(), MAX_PAGES);
        mock.assert_async().await;
    }

    #[test]
    fn test_service_filter_escapes_quotes() {
        assert_eq!(service_filter("o'hara"), "serviceId eq 'o''hara'");
    }
}
