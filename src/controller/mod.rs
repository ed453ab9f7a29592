//! View Controller
//!
//! Sequences load and mutation operations for the request list screen.
//! Mutations are confirm-then-mutate: the store changes only after the
//! backend accepted the call. This is the only layer with side effects on
//! failure (session clear, login redirect flag, user-facing message).

mod error;
mod state;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{
    from_custom_design, from_service_ticket, metal_label, today, DomainError, Metal, RequestKind,
    UnifiedRequest,
};
use crate::gateway::{GatewayError, RequestGateway};
use crate::session::{Session, SessionProvider};
use crate::store::KindFilter;

pub use error::{ControllerError, ControllerResult};
pub use state::{RequestDetails, ViewState};

use state::{ControllerState, InFlight};

pub const MSG_LOGIN_TO_VIEW: &str = "Please log in to access service requests";
pub const MSG_LOGIN_AGAIN: &str = "Authentication required. Please log in again.";
pub const MSG_AUTH_FAILED: &str = "Authentication failed. Please log in again.";
pub const MSG_ACCESS_DENIED: &str =
    "Access denied. You do not have permission to view service requests.";
pub const MSG_NETWORK: &str = "Network error. Please check your connection and try again.";
pub const MSG_STATUS_UPDATED: &str = "Status updated";
pub const MSG_REFRESHED: &str = "Requests refreshed successfully";

/// Which operation a failure came from; picks the user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Load,
    ChangeStatus,
    Delete(Option<RequestKind>),
    Details,
}

pub struct RequestsController {
    gateway: Arc<dyn RequestGateway>,
    session: Arc<dyn SessionProvider>,
    state: Mutex<ControllerState>,
    in_flight: InFlight,
}

impl RequestsController {
    pub fn new(gateway: Arc<dyn RequestGateway>, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            gateway,
            session,
            state: Mutex::new(ControllerState::default()),
            in_flight: InFlight::default(),
        }
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================
    // View
    // ========================

    pub fn view(&self) -> ViewState {
        self.state().view()
    }

    /// Current filtered records
    pub fn records(&self) -> Vec<UnifiedRequest> {
        self.view().records
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn set_search_term(&self, term: &str) {
        self.state().search_term = term.to_string();
    }

    pub fn set_kind_filter(&self, filter: KindFilter) {
        self.state().kind_filter = filter;
    }

    /// A status change or delete is pending for `id`
    pub fn is_in_flight(&self, id: &str) -> bool {
        self.in_flight.contains(id)
    }

    /// Presentation has routed to login
    pub fn acknowledge_login_redirect(&self) {
        self.state().login_required = false;
    }

    pub fn dismiss_messages(&self) {
        let mut state = self.state();
        state.error = None;
        state.notice = None;
    }

    // ========================
    // Load
    // ========================

    /// Fetch tickets and designs together and replace the store
    pub async fn load(&self) -> ControllerResult<()> {
        let Some(session) = self.session.current() else {
            let mut state = self.state();
            state.store.clear();
            state.loading = false;
            let err = ControllerError::AuthRequired;
            self.report(&mut state, Operation::Load, &err);
            return Err(err);
        };

        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
            state.notice = None;
        }

        let result = self.gateway.list_requests(&session).await;

        let mut state = self.state();
        state.loading = false;
        match result {
            Ok((tickets, designs)) => {
                let today = today();
                let records: Vec<UnifiedRequest> = tickets
                    .iter()
                    .map(|ticket| from_service_ticket(ticket, today))
                    .chain(designs.iter().map(|design| from_custom_design(design, today)))
                    .collect();
                log::info!(
                    "Loaded {} service tickets and {} custom designs",
                    tickets.len(),
                    designs.len()
                );
                state.store.replace_all(records);
                state.login_required = false;
                Ok(())
            }
            Err(e) => {
                state.store.clear();
                let err = ControllerError::from(e);
                self.report(&mut state, Operation::Load, &err);
                Err(err)
            }
        }
    }

    /// `load` with a success notice
    pub async fn refresh(&self) -> ControllerResult<()> {
        self.load().await?;
        self.state().notice = Some(MSG_REFRESHED.to_string());
        Ok(())
    }

    // ========================
    // Mutations
    // ========================

    /// Change a request's status once the backend has accepted it
    pub async fn change_status(&self, id: &str, new_status: &str) -> ControllerResult<()> {
        let result = self.try_change_status(id, new_status).await;
        let mut state = self.state();
        match &result {
            Ok(()) => {
                state.error = None;
                state.notice = Some(MSG_STATUS_UPDATED.to_string());
            }
            Err(err) => self.report(&mut state, Operation::ChangeStatus, err),
        }
        result
    }

    async fn try_change_status(&self, id: &str, new_status: &str) -> ControllerResult<()> {
        let new_status = new_status.trim();
        if new_status.is_empty() {
            return Err(DomainError::InvalidInput("a status must be selected".to_string()).into());
        }
        let session = self.require_session()?;
        let record = self.find(id)?;
        let status = record.kind.parse_status(new_status)?;
        let _guard = self
            .in_flight
            .claim(id)
            .ok_or_else(|| ControllerError::InFlight(id.to_string()))?;

        self.gateway.update_status(&session, &record, status).await?;

        self.state().store.update_status(id, status)?;
        log::info!("{} status set to {}", id, status);
        Ok(())
    }

    /// Delete a request once the backend has accepted it
    pub async fn delete_request(&self, id: &str) -> ControllerResult<()> {
        let kind = self.state().store.get(id).map(|record| record.kind);
        let result = self.try_delete_request(id).await;
        let mut state = self.state();
        match &result {
            Ok(()) => {
                state.error = None;
                let label = kind.map(|kind| kind.label()).unwrap_or("Request");
                state.notice = Some(format!("{} deleted successfully", label));
            }
            Err(err) => self.report(&mut state, Operation::Delete(kind), err),
        }
        result
    }

    async fn try_delete_request(&self, id: &str) -> ControllerResult<()> {
        let session = self.require_session()?;
        let record = self.find(id)?;
        let _guard = self
            .in_flight
            .claim(id)
            .ok_or_else(|| ControllerError::InFlight(id.to_string()))?;

        self.gateway.delete_request(&session, &record).await?;

        self.state().store.remove(id)?;
        log::info!("{} deleted", id);
        Ok(())
    }

    // ========================
    // Details
    // ========================

    /// Details for one request, resolving a design's preferred metal
    pub async fn request_details(&self, id: &str) -> ControllerResult<RequestDetails> {
        let record = match self.find(id) {
            Ok(record) => record,
            Err(err) => {
                self.report(&mut self.state(), Operation::Details, &err);
                return Err(err);
            }
        };

        let metal_label = match record.kind {
            RequestKind::CustomDesign => Some(self.preferred_metal_label(&record).await?),
            RequestKind::ServiceTicket => None,
        };

        Ok(RequestDetails {
            status_options: record.kind.statuses().to_vec(),
            images: record.images().into_iter().map(str::to_string).collect(),
            metal_label,
            request: record,
        })
    }

    async fn preferred_metal_label(&self, record: &UnifiedRequest) -> ControllerResult<String> {
        let metal_id = record.preferred_metal_id();
        if metal_id.is_none() {
            return Ok(metal_label(&[], None));
        }
        let metals = self.metals().await?;
        Ok(metal_label(&metals, metal_id))
    }

    /// Metal lookup table, fetched once and cached
    ///
    /// Lookup failures other than a rejected session only degrade the label.
    async fn metals(&self) -> ControllerResult<Vec<Metal>> {
        if let Some(metals) = self.state().metals.clone() {
            return Ok(metals);
        }
        let Some(session) = self.session.current() else {
            return Ok(Vec::new());
        };
        match self.gateway.list_metals(&session).await {
            Ok(metals) => {
                self.state().metals = Some(metals.clone());
                Ok(metals)
            }
            Err(GatewayError::Unauthorized) => {
                let err = ControllerError::Gateway(GatewayError::Unauthorized);
                self.report(&mut self.state(), Operation::Details, &err);
                Err(err)
            }
            Err(e) => {
                log::warn!("Error fetching metals: {}", e);
                Ok(Vec::new())
            }
        }
    }

    // ========================
    // Helpers
    // ========================

    fn require_session(&self) -> ControllerResult<Session> {
        self.session.current().ok_or(ControllerError::AuthRequired)
    }

    fn find(&self, id: &str) -> ControllerResult<UnifiedRequest> {
        self.state()
            .store
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(id.to_string()).into())
    }

    /// Record a failure for presentation; a rejected session is cleared here
    fn report(&self, state: &mut ControllerState, operation: Operation, err: &ControllerError) {
        let message = match err {
            ControllerError::AuthRequired => match operation {
                Operation::Load => MSG_LOGIN_TO_VIEW.to_string(),
                _ => MSG_LOGIN_AGAIN.to_string(),
            },
            ControllerError::Gateway(GatewayError::Unauthorized) => {
                log::warn!("Session rejected by backend, clearing it");
                self.session.clear();
                state.login_required = true;
                MSG_AUTH_FAILED.to_string()
            }
            ControllerError::Gateway(GatewayError::Unreachable(_)) => MSG_NETWORK.to_string(),
            ControllerError::Gateway(GatewayError::Forbidden(_)) if operation == Operation::Load => {
                MSG_ACCESS_DENIED.to_string()
            }
            ControllerError::Gateway(gateway) => match operation {
                Operation::Load => format!(
                    "Failed to load requests: {}",
                    backend_message(gateway).unwrap_or_else(|| gateway.to_string())
                ),
                Operation::ChangeStatus => backend_message(gateway)
                    .unwrap_or_else(|| "Failed to update status".to_string()),
                Operation::Delete(kind) => delete_failure(kind),
                Operation::Details => gateway.to_string(),
            },
            ControllerError::Domain(_) | ControllerError::InFlight(_) => err.to_string(),
        };
        log::warn!("{:?} failed: {}", operation, err);
        state.error = Some(message);
        state.notice = None;
    }
}

/// The backend's own message where it sent one
fn backend_message(err: &GatewayError) -> Option<String> {
    match err {
        GatewayError::ServerError { message, .. } | GatewayError::Forbidden(message) => {
            Some(message.clone())
        }
        _ => None,
    }
}

fn delete_failure(kind: Option<RequestKind>) -> String {
    match kind {
        Some(kind) => format!("Failed to delete {}", kind.label().to_lowercase()),
        None => "Failed to delete request".to_string(),
    }
}
