//! Unified Request
//!
//! One display model for both service tickets and custom designs.

use chrono::NaiveDate;
use serde::Serialize;

use super::design::CustomDesign;
use super::error::DomainResult;
use super::kind::{RequestKind, RequestStatus};
use super::ticket::ServiceTicket;

/// The backend record a unified request was built from
///
/// Serializes as the bare backend object, which is the PUT payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RawRecord {
    ServiceTicket(ServiceTicket),
    CustomDesign(CustomDesign),
}

impl RawRecord {
    pub fn kind(&self) -> RequestKind {
        match self {
            RawRecord::ServiceTicket(_) => RequestKind::ServiceTicket,
            RawRecord::CustomDesign(_) => RequestKind::CustomDesign,
        }
    }

    /// Numeric id used in backend paths (`serviceId` / `designId`)
    pub fn backend_id(&self) -> u64 {
        match self {
            RawRecord::ServiceTicket(ticket) => ticket.service_id,
            RawRecord::CustomDesign(design) => design.design_id,
        }
    }

    pub fn status(&self) -> RequestStatus {
        match self {
            RawRecord::ServiceTicket(ticket) => ticket.status,
            RawRecord::CustomDesign(design) => design.status,
        }
    }

    pub fn with_status(&self, status: RequestStatus) -> DomainResult<Self> {
        Ok(match self {
            RawRecord::ServiceTicket(ticket) => RawRecord::ServiceTicket(ticket.with_status(status)?),
            RawRecord::CustomDesign(design) => RawRecord::CustomDesign(design.with_status(status)?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Customer {
    pub fn new(first_name: &str, last_name: &str, email: &str, phone: &str) -> Self {
        Self {
            name: format!("{} {}", first_name.trim(), last_name.trim()).trim().to_string(),
            email: email.trim().to_string(),
            phone: phone.trim().to_string(),
        }
    }
}

/// A service ticket or custom design in display form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRequest {
    /// `ST-<serviceId>` or `CD-<designId>`
    pub id: String,
    pub kind: RequestKind,
    pub customer: Customer,
    pub subject: String,
    pub description: String,
    pub submitted_at: NaiveDate,
    pub status: RequestStatus,
    pub notes: Option<String>,
    pub raw: RawRecord,
}

impl UnifiedRequest {
    pub fn unified_id(kind: RequestKind, backend_id: u64) -> String {
        format!("{}-{}", kind.id_prefix(), backend_id)
    }

    /// Copy with `status` applied to both the unified field and the raw record
    pub fn with_status(&self, status: RequestStatus) -> DomainResult<Self> {
        let raw = self.raw.with_status(status)?;
        Ok(Self {
            status,
            raw,
            ..self.clone()
        })
    }

    /// Case-insensitive match on customer name, email and id
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.customer.name.to_lowercase().contains(needle)
            || self.customer.email.to_lowercase().contains(needle)
            || self.id.to_lowercase().contains(needle)
    }

    /// Embedded design images (custom designs only)
    pub fn images(&self) -> Vec<&str> {
        match &self.raw {
            RawRecord::CustomDesign(design) => design.image.as_deref().into_iter().collect(),
            RawRecord::ServiceTicket(_) => Vec::new(),
        }
    }

    pub fn preferred_metal_id(&self) -> Option<u64> {
        match &self.raw {
            RawRecord::CustomDesign(design) => design.preferred_metal_id,
            RawRecord::ServiceTicket(_) => None,
        }
    }
}
