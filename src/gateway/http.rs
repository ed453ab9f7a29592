//! HTTP gateway over the admin REST backend

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::error::{GatewayError, GatewayResult};
use super::traits::RequestGateway;
use crate::config::AdminConfig;
use crate::domain::{CustomDesign, Metal, RequestKind, RequestStatus, ServiceTicket, UnifiedRequest};
use crate::session::Session;

pub const SERVICE_TICKETS_PATH: &str = "/api/serviceticket";
pub const CUSTOM_DESIGNS_PATH: &str = "/api/customdesign";
pub const METALS_PATH: &str = "/api/metals";

/// Error body shape used by the backend (`{"message": "..."}`)
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: String,
    client: Client,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn from_config(config: &AdminConfig) -> Self {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let suffix = path.trim_start_matches('/');
        format!("{base}/{suffix}")
    }

    /// Item endpoint for a record, chosen by kind
    fn record_endpoint(&self, record: &UnifiedRequest) -> String {
        let collection = match record.kind {
            RequestKind::ServiceTicket => SERVICE_TICKETS_PATH,
            RequestKind::CustomDesign => CUSTOM_DESIGNS_PATH,
        };
        self.endpoint(&format!("{}/{}", collection, record.raw.backend_id()))
    }

    async fn send(&self, request: RequestBuilder, session: &Session) -> GatewayResult<reqwest::Response> {
        let response = request
            .bearer_auth(&session.token)
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        log::debug!("Backend responded {} ({})", status.as_u16(), message);
        Err(GatewayError::from_status(status.as_u16(), message))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, session: &Session) -> GatewayResult<T> {
        let url = self.endpoint(path);
        log::debug!("GET {}", url);
        let response = self.send(self.client.get(&url), session).await?;
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;
        serde_json::from_str(&body).map_err(|e| GatewayError::MalformedResponse(format!("{url}: {e}")))
    }

    /// A JSON array of records; records that do not decode are skipped
    async fn get_records<T: DeserializeOwned>(&self, path: &str, session: &Session) -> GatewayResult<Vec<T>> {
        let items: Vec<Value> = self.get_json(path, session).await?;
        Ok(decode_records(path, items))
    }
}

fn decode_records<T: DeserializeOwned>(path: &str, items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping record {} from {}: {}", index, path, e);
                None
            }
        })
        .collect();
    if records.len() < total {
        log::warn!("{}: kept {} of {} records", path, records.len(), total);
    }
    records
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn list_service_tickets(&self, session: &Session) -> GatewayResult<Vec<ServiceTicket>> {
        self.get_records(&format!("{}/tickets", SERVICE_TICKETS_PATH), session)
            .await
    }

    async fn list_custom_designs(&self, session: &Session) -> GatewayResult<Vec<CustomDesign>> {
        self.get_records(&format!("{}/designs", CUSTOM_DESIGNS_PATH), session)
            .await
    }

    async fn update_status(
        &self,
        session: &Session,
        record: &UnifiedRequest,
        status: RequestStatus,
    ) -> GatewayResult<()> {
        // Full record: the backend has no partial update for status
        let payload = record.raw.with_status(status)?;
        let url = self.record_endpoint(record);
        log::debug!("PUT {} status={}", url, status);
        self.send(self.client.put(&url).json(&payload), session).await?;
        Ok(())
    }

    async fn delete_request(&self, session: &Session, record: &UnifiedRequest) -> GatewayResult<()> {
        let url = self.record_endpoint(record);
        log::debug!("DELETE {}", url);
        self.send(self.client.delete(&url), session).await?;
        Ok(())
    }

    async fn list_metals(&self, session: &Session) -> GatewayResult<Vec<Metal>> {
        self.get_records(METALS_PATH, session).await
    }
}
