//! Request Store
//!
//! Ordered in-memory collection of unified requests: service tickets first,
//! then custom designs, as received. Views are recomputed on every call.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::{DomainError, DomainResult, RequestKind, RequestStatus, UnifiedRequest};

/// Category tab narrowing the view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(RequestKind),
}

impl KindFilter {
    pub fn admits(&self, kind: RequestKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(only) => *only == kind,
        }
    }

    /// Tab name: "all", "service" or "custom"
    pub fn as_str(&self) -> &'static str {
        match self {
            KindFilter::All => "all",
            KindFilter::Only(RequestKind::ServiceTicket) => "service",
            KindFilter::Only(RequestKind::CustomDesign) => "custom",
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KindFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(KindFilter::All),
            "service" | "ticket" | "st" => Ok(KindFilter::Only(RequestKind::ServiceTicket)),
            "custom" | "design" | "cd" => Ok(KindFilter::Only(RequestKind::CustomDesign)),
            other => Err(DomainError::InvalidInput(format!("unknown request category {:?}", other))),
        }
    }
}

/// Tab counts, derived from the current records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KindCounts {
    pub all: usize,
    pub service_tickets: usize,
    pub custom_designs: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestStore {
    records: Vec<UnifiedRequest>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every record in one step
    pub fn replace_all(&mut self, records: Vec<UnifiedRequest>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[UnifiedRequest] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&UnifiedRequest> {
        self.records.iter().find(|record| record.id == id)
    }

    /// Records matching `term` (name, email or id; case-insensitive) within `kind`
    pub fn filter(&self, term: &str, kind: KindFilter) -> Vec<&UnifiedRequest> {
        let needle = term.trim().to_lowercase();
        self.records
            .iter()
            .filter(|record| kind.admits(record.kind) && record.matches(&needle))
            .collect()
    }

    /// Set a record's status, in the unified field and the raw record together
    pub fn update_status(&mut self, id: &str, status: RequestStatus) -> DomainResult<()> {
        let record = self
            .records
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;
        *record = record.with_status(status)?;
        Ok(())
    }

    /// Remove a record by id
    pub fn remove(&mut self, id: &str) -> DomainResult<UnifiedRequest> {
        let index = self
            .records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;
        Ok(self.records.remove(index))
    }

    pub fn counts(&self) -> KindCounts {
        let service_tickets = self
            .records
            .iter()
            .filter(|record| record.kind == RequestKind::ServiceTicket)
            .count();
        KindCounts {
            all: self.records.len(),
            service_tickets,
            custom_designs: self.records.len() - service_tickets,
        }
    }
}
