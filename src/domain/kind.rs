//! Request kinds and the status vocabulary they share
//!
//! `RequestKind` is the single discriminant between service tickets and
//! custom designs. Each kind accepts a subset of `RequestStatus`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{DomainError, DomainResult};

/// Which backend resource a unified request was built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestKind {
    ServiceTicket,
    CustomDesign,
}

const TICKET_STATUSES: &[RequestStatus] = &[
    RequestStatus::New,
    RequestStatus::InProgress,
    RequestStatus::Done,
    RequestStatus::Cancelled,
];

const DESIGN_STATUSES: &[RequestStatus] = &[
    RequestStatus::New,
    RequestStatus::Reviewed,
    RequestStatus::InProgress,
    RequestStatus::Quoted,
    RequestStatus::Closed,
];

impl RequestKind {
    pub const ALL: [RequestKind; 2] = [RequestKind::ServiceTicket, RequestKind::CustomDesign];

    /// Display label, e.g. "Service Ticket"
    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::ServiceTicket => "Service Ticket",
            RequestKind::CustomDesign => "Custom Design",
        }
    }

    /// Prefix used for unified ids ("ST" / "CD")
    pub fn id_prefix(&self) -> &'static str {
        match self {
            RequestKind::ServiceTicket => "ST",
            RequestKind::CustomDesign => "CD",
        }
    }

    /// Statuses a record of this kind may carry, in workflow order
    pub fn statuses(&self) -> &'static [RequestStatus] {
        match self {
            RequestKind::ServiceTicket => TICKET_STATUSES,
            RequestKind::CustomDesign => DESIGN_STATUSES,
        }
    }

    pub fn allows(&self, status: RequestStatus) -> bool {
        self.statuses().contains(&status)
    }

    /// Reject a status outside this kind's vocabulary
    pub fn check_status(&self, status: RequestStatus) -> DomainResult<RequestStatus> {
        if self.allows(status) {
            Ok(status)
        } else {
            Err(DomainError::InvalidStatus {
                kind: *self,
                status: status.as_str().to_string(),
            })
        }
    }

    /// Parse a status string and check it against this kind's vocabulary
    pub fn parse_status(&self, raw: &str) -> DomainResult<RequestStatus> {
        let status = raw.parse::<RequestStatus>().map_err(|_| DomainError::InvalidStatus {
            kind: *self,
            status: raw.to_string(),
        })?;
        self.check_status(status)
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Union of both status vocabularies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    New,
    Reviewed,
    InProgress,
    Quoted,
    Done,
    Cancelled,
    Closed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "NEW",
            RequestStatus::Reviewed => "REVIEWED",
            RequestStatus::InProgress => "IN_PROGRESS",
            RequestStatus::Quoted => "QUOTED",
            RequestStatus::Done => "DONE",
            RequestStatus::Cancelled => "CANCELLED",
            RequestStatus::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "NEW" => Ok(RequestStatus::New),
            "REVIEWED" => Ok(RequestStatus::Reviewed),
            "IN_PROGRESS" => Ok(RequestStatus::InProgress),
            "QUOTED" => Ok(RequestStatus::Quoted),
            "DONE" => Ok(RequestStatus::Done),
            "CANCELLED" => Ok(RequestStatus::Cancelled),
            "CLOSED" => Ok(RequestStatus::Closed),
            _ => Err(DomainError::InvalidInput(format!("unknown status {:?}", s))),
        }
    }
}
