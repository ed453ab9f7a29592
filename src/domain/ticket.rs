//! Service Ticket Entity
//!
//! Backend record for a cleaning, repair or resize request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::DomainResult;
use super::kind::{RequestKind, RequestStatus};
use super::wire::null_as_empty;

/// A service ticket as returned by `/api/serviceticket/tickets`
///
/// Fields the admin console does not read are kept in `extra` so a full
/// record PUT sends them back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceTicket {
    pub service_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<u64>,
    /// CLEANING, REPAIR, RESIZE or OTHER
    #[serde(rename = "type", default, deserialize_with = "null_as_empty")]
    pub ticket_type: String,
    #[serde(deserialize_with = "deserialize_ticket_status")]
    pub status: RequestStatus,
    /// HIGH, MEDIUM or LOW
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_fname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_lname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contact_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_date: Option<String>,
    /// ISO timestamp, e.g. "2024-05-01T10:15:00"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_ticket_status<'de, D>(deserializer: D) -> Result<RequestStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    RequestKind::ServiceTicket
        .parse_status(&raw)
        .map_err(serde::de::Error::custom)
}

impl ServiceTicket {
    /// Create a NEW ticket with empty customer details
    pub fn new(service_id: u64, ticket_type: &str) -> Self {
        Self {
            service_id,
            branch_id: None,
            assigned_user_id: None,
            ticket_type: ticket_type.to_string(),
            status: RequestStatus::New,
            priority: None,
            customer_fname: String::new(),
            customer_lname: String::new(),
            email: String::new(),
            contact_number: String::new(),
            note: None,
            preferred_date: None,
            ticket_date: None,
            extra: Map::new(),
        }
    }

    /// Copy of this ticket carrying `status`, rejected if outside the ticket vocabulary
    pub fn with_status(&self, status: RequestStatus) -> DomainResult<Self> {
        RequestKind::ServiceTicket.check_status(status)?;
        Ok(Self {
            status,
            ..self.clone()
        })
    }
}
