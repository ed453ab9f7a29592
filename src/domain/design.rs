//! Custom Design Entity
//!
//! Backend record for a bespoke jewellery design inquiry.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::error::DomainResult;
use super::kind::{RequestKind, RequestStatus};
use super::wire::null_as_empty;

/// A custom design as returned by `/api/customdesign/designs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDesign {
    pub design_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_user_id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_fname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub customer_lname: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub contact_number: String,
    /// Budget in LKR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    /// Reference image, either bare base64 or a `data:` URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticket_date: Option<String>,
    #[serde(deserialize_with = "deserialize_design_status")]
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_metal_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn deserialize_design_status<'de, D>(deserializer: D) -> Result<RequestStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    RequestKind::CustomDesign
        .parse_status(&raw)
        .map_err(serde::de::Error::custom)
}

impl CustomDesign {
    /// Create a NEW design inquiry with empty customer details
    pub fn new(design_id: u64) -> Self {
        Self {
            design_id,
            assigned_user_id: None,
            customer_fname: String::new(),
            customer_lname: String::new(),
            email: String::new(),
            contact_number: String::new(),
            budget: None,
            image: None,
            ticket_date: None,
            status: RequestStatus::New,
            preferred_metal_id: None,
            extra: Map::new(),
        }
    }

    /// Budget worth showing; zero counts as not specified
    pub fn stated_budget(&self) -> Option<f64> {
        self.budget.filter(|budget| *budget > 0.0)
    }

    pub fn with_status(&self, status: RequestStatus) -> DomainResult<Self> {
        RequestKind::CustomDesign.check_status(status)?;
        Ok(Self {
            status,
            ..self.clone()
        })
    }
}
