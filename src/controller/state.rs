//! State the controller exposes to presentation

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::{Metal, RequestStatus, UnifiedRequest};
use crate::store::{KindCounts, KindFilter, RequestStore};

/// Snapshot of everything a request list screen renders
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub loading: bool,
    /// Records passing the current search term and category
    pub records: Vec<UnifiedRequest>,
    pub error: Option<String>,
    pub notice: Option<String>,
    /// Session was rejected; presentation should route to login
    pub login_required: bool,
    pub counts: KindCounts,
    pub search_term: String,
    pub kind_filter: KindFilter,
}

/// Everything the request details dialog shows
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDetails {
    pub request: UnifiedRequest,
    /// Statuses selectable for this request's kind
    pub status_options: Vec<RequestStatus>,
    /// Preferred metal label (custom designs only)
    pub metal_label: Option<String>,
    pub images: Vec<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ControllerState {
    pub store: RequestStore,
    pub loading: bool,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub login_required: bool,
    pub search_term: String,
    pub kind_filter: KindFilter,
    pub metals: Option<Vec<Metal>>,
}

impl ControllerState {
    pub fn view(&self) -> ViewState {
        ViewState {
            loading: self.loading,
            records: self
                .store
                .filter(&self.search_term, self.kind_filter)
                .into_iter()
                .cloned()
                .collect(),
            error: self.error.clone(),
            notice: self.notice.clone(),
            login_required: self.login_required,
            counts: self.store.counts(),
            search_term: self.search_term.clone(),
            kind_filter: self.kind_filter,
        }
    }
}

/// Ids with a status change or delete pending
#[derive(Debug, Clone, Default)]
pub(crate) struct InFlight {
    ids: Arc<Mutex<HashSet<String>>>,
}

impl InFlight {
    /// Claim `id`; None if it is already claimed
    pub fn claim(&self, id: &str) -> Option<InFlightGuard> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            ids: Arc::clone(&self.ids),
            id: id.to_string(),
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Releases the claim when the operation finishes, whatever the outcome
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    ids: Arc<Mutex<HashSet<String>>>,
    id: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
