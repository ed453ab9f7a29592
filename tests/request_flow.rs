use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use kalyani_admin::controller::{
    MSG_ACCESS_DENIED, MSG_AUTH_FAILED, MSG_LOGIN_AGAIN, MSG_LOGIN_TO_VIEW, MSG_NETWORK,
    MSG_REFRESHED, MSG_STATUS_UPDATED,
};
use kalyani_admin::gateway::GatewayResult;
use kalyani_admin::{
    ControllerError, CustomDesign, DomainError, GatewayError, KindFilter, MemorySession, Metal,
    RawRecord, RequestGateway, RequestKind, RequestStatus, RequestsController, ServiceTicket,
    Session, SessionProvider, UnifiedRequest,
};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ListTickets,
    ListDesigns,
    UpdateStatus(String, RequestStatus),
    Delete(String),
    ListMetals,
}

#[derive(Default)]
struct FakeGateway {
    tickets: Vec<ServiceTicket>,
    designs: Vec<CustomDesign>,
    metals: Vec<Metal>,
    calls: Mutex<Vec<Call>>,
    tickets_error: Mutex<Option<GatewayError>>,
    designs_error: Mutex<Option<GatewayError>>,
    mutation_error: Mutex<Option<GatewayError>>,
    metals_error: Mutex<Option<GatewayError>>,
    /// When set, mutations wait for a notification before answering
    gate: Option<Arc<Notify>>,
    entered: Arc<Notify>,
}

impl FakeGateway {
    fn with_records(tickets: Vec<ServiceTicket>, designs: Vec<CustomDesign>) -> Self {
        Self {
            tickets,
            designs,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail_mutations(&self, err: GatewayError) {
        *self.mutation_error.lock().unwrap() = Some(err);
    }

    async fn mutation_result(&self) -> GatewayResult<()> {
        if let Some(gate) = &self.gate {
            self.entered.notify_one();
            gate.notified().await;
        }
        match self.mutation_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RequestGateway for FakeGateway {
    async fn list_service_tickets(&self, _session: &Session) -> GatewayResult<Vec<ServiceTicket>> {
        self.record(Call::ListTickets);
        match self.tickets_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(self.tickets.clone()),
        }
    }

    async fn list_custom_designs(&self, _session: &Session) -> GatewayResult<Vec<CustomDesign>> {
        self.record(Call::ListDesigns);
        match self.designs_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(self.designs.clone()),
        }
    }

    async fn update_status(
        &self,
        _session: &Session,
        record: &UnifiedRequest,
        status: RequestStatus,
    ) -> GatewayResult<()> {
        self.record(Call::UpdateStatus(record.id.clone(), status));
        self.mutation_result().await
    }

    async fn delete_request(&self, _session: &Session, record: &UnifiedRequest) -> GatewayResult<()> {
        self.record(Call::Delete(record.id.clone()));
        self.mutation_result().await
    }

    async fn list_metals(&self, _session: &Session) -> GatewayResult<Vec<Metal>> {
        self.record(Call::ListMetals);
        match self.metals_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(self.metals.clone()),
        }
    }
}

fn ticket(id: u64, first: &str, last: &str, email: &str) -> ServiceTicket {
    let mut ticket = ServiceTicket::new(id, "REPAIR");
    ticket.customer_fname = first.to_string();
    ticket.customer_lname = last.to_string();
    ticket.email = email.to_string();
    ticket.ticket_date = Some("2024-05-01T10:15:00".to_string());
    ticket
}

fn design(id: u64, first: &str, last: &str, email: &str) -> CustomDesign {
    let mut design = CustomDesign::new(id);
    design.customer_fname = first.to_string();
    design.customer_lname = last.to_string();
    design.email = email.to_string();
    design.ticket_date = Some("2024-05-03".to_string());
    design
}

fn scenario_gateway() -> FakeGateway {
    FakeGateway::with_records(
        vec![ticket(12, "Nimal", "Perera", "nimal@example.com")],
        vec![design(7, "Anu", "Silva", "anu@example.com")],
    )
}

struct Fixture {
    gateway: Arc<FakeGateway>,
    session: Arc<MemorySession>,
    controller: RequestsController,
}

fn fixture(gateway: FakeGateway) -> Fixture {
    let gateway = Arc::new(gateway);
    let session = Arc::new(MemorySession::signed_in(Session::new("tok", "42")));
    let controller = RequestsController::new(gateway.clone(), session.clone());
    Fixture {
        gateway,
        session,
        controller,
    }
}

fn ids(records: &[UnifiedRequest]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

// ========================
// Load
// ========================

#[tokio::test]
async fn test_load_without_session_makes_no_calls() {
    let gateway = Arc::new(scenario_gateway());
    let controller = RequestsController::new(gateway.clone(), Arc::new(MemorySession::new()));

    let err = controller.load().await.unwrap_err();
    assert_eq!(err, ControllerError::AuthRequired);
    assert!(gateway.calls().is_empty());

    let view = controller.view();
    assert!(view.records.is_empty());
    assert_eq!(view.error.as_deref(), Some(MSG_LOGIN_TO_VIEW));
    assert!(!view.loading);
}

#[tokio::test]
async fn test_load_orders_tickets_before_designs() {
    let gateway = FakeGateway::with_records(
        vec![
            ticket(12, "Nimal", "Perera", "nimal@example.com"),
            ticket(3, "Kasun", "Fernando", "kasun@example.com"),
        ],
        vec![design(7, "Anu", "Silva", "anu@example.com")],
    );
    let f = fixture(gateway);

    f.controller.load().await.unwrap();

    let view = f.controller.view();
    assert_eq!(ids(&view.records), vec!["ST-12", "ST-3", "CD-7"]);
    assert_eq!(view.counts.all, 3);
    assert_eq!(view.counts.service_tickets, 2);
    assert_eq!(view.counts.custom_designs, 1);
    assert!(view.error.is_none());
    assert!(!view.loading);

    let calls = f.gateway.calls();
    assert!(calls.contains(&Call::ListTickets));
    assert!(calls.contains(&Call::ListDesigns));
}

#[tokio::test]
async fn test_load_empty_lists() {
    let f = fixture(FakeGateway::with_records(vec![], vec![]));
    f.controller.load().await.unwrap();

    let view = f.controller.view();
    assert!(view.records.is_empty());
    assert_eq!(view.counts.all, 0);
    assert_eq!(view.counts.service_tickets, 0);
    assert_eq!(view.counts.custom_designs, 0);
    assert!(view.error.is_none());
    assert!(!view.loading);
}

#[tokio::test]
async fn test_load_record_with_blank_customer() {
    let mut blank = ServiceTicket::new(5, "CLEANING");
    blank.ticket_date = None;
    let f = fixture(FakeGateway::with_records(vec![blank], vec![CustomDesign::new(9)]));
    f.controller.load().await.unwrap();

    let records = f.controller.records();
    assert_eq!(ids(&records), vec!["ST-5", "CD-9"]);
    assert_eq!(records[0].customer.name, "");
    assert_eq!(records[1].description, "Budget: Not specified");

    f.controller.set_search_term("st-5");
    assert_eq!(ids(&f.controller.records()), vec!["ST-5"]);
}

#[tokio::test]
async fn test_refresh_sets_notice() {
    let f = fixture(scenario_gateway());
    f.controller.refresh().await.unwrap();
    assert_eq!(f.controller.view().notice.as_deref(), Some(MSG_REFRESHED));
}

#[tokio::test]
async fn test_load_failure_of_either_list_leaves_store_empty() {
    for designs_fail in [false, true] {
        let gateway = scenario_gateway();
        let err = GatewayError::ServerError {
            status: 500,
            message: "database offline".to_string(),
        };
        if designs_fail {
            *gateway.designs_error.lock().unwrap() = Some(err);
        } else {
            *gateway.tickets_error.lock().unwrap() = Some(err);
        }
        let f = fixture(gateway);

        assert!(f.controller.load().await.is_err());
        let view = f.controller.view();
        assert!(view.records.is_empty());
        assert_eq!(view.counts.all, 0);
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to load requests: database offline")
        );
    }
}

#[tokio::test]
async fn test_load_classifies_forbidden_and_network() {
    let gateway = scenario_gateway();
    *gateway.tickets_error.lock().unwrap() = Some(GatewayError::Forbidden("Forbidden".to_string()));
    let f = fixture(gateway);
    f.controller.load().await.unwrap_err();
    assert_eq!(f.controller.view().error.as_deref(), Some(MSG_ACCESS_DENIED));
    assert!(f.session.current().is_some());

    let gateway = scenario_gateway();
    *gateway.designs_error.lock().unwrap() =
        Some(GatewayError::Unreachable("connection refused".to_string()));
    let f = fixture(gateway);
    f.controller.load().await.unwrap_err();
    assert_eq!(f.controller.view().error.as_deref(), Some(MSG_NETWORK));
}

#[tokio::test]
async fn test_load_unauthorized_clears_session() {
    let gateway = scenario_gateway();
    *gateway.tickets_error.lock().unwrap() = Some(GatewayError::Unauthorized);
    let f = fixture(gateway);

    let err = f.controller.load().await.unwrap_err();
    assert!(err.is_auth_failure());

    let view = f.controller.view();
    assert!(view.login_required);
    assert_eq!(view.error.as_deref(), Some(MSG_AUTH_FAILED));
    assert!(f.session.current().is_none());

    f.controller.acknowledge_login_redirect();
    assert!(!f.controller.view().login_required);
}

// ========================
// Filtering
// ========================

#[tokio::test]
async fn test_search_and_category_filter() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.controller.set_kind_filter(KindFilter::Only(RequestKind::ServiceTicket));
    assert_eq!(ids(&f.controller.records()), vec!["ST-12"]);

    f.controller.set_kind_filter(KindFilter::All);
    f.controller.set_search_term("ANU@");
    assert_eq!(ids(&f.controller.records()), vec!["CD-7"]);

    f.controller.set_search_term("cd-");
    f.controller.set_kind_filter(KindFilter::Only(RequestKind::ServiceTicket));
    assert!(f.controller.records().is_empty());

    // Counts ignore the active filters
    assert_eq!(f.controller.view().counts.all, 2);
}

// ========================
// Status changes
// ========================

#[tokio::test]
async fn test_change_status_updates_only_target() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.controller.change_status("ST-12", "DONE").await.unwrap();

    assert_eq!(
        f.gateway.calls().last(),
        Some(&Call::UpdateStatus("ST-12".to_string(), RequestStatus::Done))
    );

    let view = f.controller.view();
    assert_eq!(view.notice.as_deref(), Some(MSG_STATUS_UPDATED));
    let ticket = &view.records[0];
    assert_eq!(ticket.status, RequestStatus::Done);
    match &ticket.raw {
        RawRecord::ServiceTicket(raw) => assert_eq!(raw.status, RequestStatus::Done),
        other => panic!("unexpected raw record {:?}", other),
    }
    assert_eq!(view.records[1].status, RequestStatus::New);
}

#[tokio::test]
async fn test_change_status_unauthorized_leaves_store_unchanged() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();
    let before = f.controller.records();

    f.gateway.fail_mutations(GatewayError::Unauthorized);
    let err = f.controller.change_status("ST-12", "DONE").await.unwrap_err();
    assert_eq!(err, ControllerError::Gateway(GatewayError::Unauthorized));

    assert_eq!(f.controller.records(), before);
    let view = f.controller.view();
    assert!(view.login_required);
    assert_eq!(view.error.as_deref(), Some(MSG_AUTH_FAILED));
    assert!(f.session.current().is_none());

    // Further mutations stop before the network
    let calls = f.gateway.calls().len();
    let err = f.controller.change_status("ST-12", "DONE").await.unwrap_err();
    assert_eq!(err, ControllerError::AuthRequired);
    assert_eq!(f.gateway.calls().len(), calls);
    assert_eq!(f.controller.view().error.as_deref(), Some(MSG_LOGIN_AGAIN));
}

#[tokio::test]
async fn test_change_status_server_error_uses_backend_message() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.gateway.fail_mutations(GatewayError::ServerError {
        status: 409,
        message: "Ticket is locked".to_string(),
    });
    f.controller.change_status("ST-12", "DONE").await.unwrap_err();
    assert_eq!(f.controller.view().error.as_deref(), Some("Ticket is locked"));
    assert_eq!(f.controller.records()[0].status, RequestStatus::New);
}

#[tokio::test]
async fn test_change_status_rejects_bad_input_without_calls() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();
    let calls = f.gateway.calls().len();

    let err = f.controller.change_status("ST-12", "  ").await.unwrap_err();
    assert!(matches!(err, ControllerError::Domain(DomainError::InvalidInput(_))));

    // QUOTED belongs to custom designs only
    let err = f.controller.change_status("ST-12", "QUOTED").await.unwrap_err();
    assert!(matches!(
        err,
        ControllerError::Domain(DomainError::InvalidStatus {
            kind: RequestKind::ServiceTicket,
            ..
        })
    ));

    let err = f.controller.change_status("ST-99", "DONE").await.unwrap_err();
    assert_eq!(err, ControllerError::Domain(DomainError::NotFound("ST-99".to_string())));

    assert_eq!(f.gateway.calls().len(), calls);
    assert!(f.controller.view().error.is_some());
}

#[tokio::test]
async fn test_design_accepts_design_statuses() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.controller.change_status("CD-7", "quoted").await.unwrap();
    let view = f.controller.view();
    assert_eq!(view.records[1].status, RequestStatus::Quoted);
    assert_eq!(view.records[0].status, RequestStatus::New);
}

#[tokio::test]
async fn test_concurrent_mutation_on_same_record_is_rejected() {
    let gate = Arc::new(Notify::new());
    let mut gateway = scenario_gateway();
    gateway.gate = Some(gate.clone());
    let entered = gateway.entered.clone();
    let f = fixture(gateway);
    f.controller.load().await.unwrap();

    let controller = &f.controller;
    let first = async { controller.change_status("ST-12", "DONE").await };
    let second = async {
        entered.notified().await;
        assert!(controller.is_in_flight("ST-12"));
        let status = controller.change_status("ST-12", "CANCELLED").await;
        let delete = controller.delete_request("ST-12").await;
        // A different record is not blocked by the pending one
        assert!(!controller.is_in_flight("CD-7"));
        gate.notify_one();
        (status, delete)
    };

    let (first, (status, delete)) = tokio::join!(first, second);
    first.unwrap();
    assert_eq!(status.unwrap_err(), ControllerError::InFlight("ST-12".to_string()));
    assert_eq!(delete.unwrap_err(), ControllerError::InFlight("ST-12".to_string()));

    assert!(!f.controller.is_in_flight("ST-12"));
    assert_eq!(f.controller.records()[0].status, RequestStatus::Done);
    let updates = f
        .gateway
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::UpdateStatus(..) | Call::Delete(_)))
        .count();
    assert_eq!(updates, 1);
}

// ========================
// Delete
// ========================

#[tokio::test]
async fn test_delete_removes_only_target() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.controller.delete_request("CD-7").await.unwrap();

    assert_eq!(f.gateway.calls().last(), Some(&Call::Delete("CD-7".to_string())));
    let view = f.controller.view();
    assert_eq!(ids(&view.records), vec!["ST-12"]);
    assert_eq!(view.counts.custom_designs, 0);
    assert_eq!(view.notice.as_deref(), Some("Custom Design deleted successfully"));
}

#[tokio::test]
async fn test_delete_failure_keeps_record() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.gateway.fail_mutations(GatewayError::ServerError {
        status: 500,
        message: "Internal Server Error".to_string(),
    });
    f.controller.delete_request("ST-12").await.unwrap_err();

    let view = f.controller.view();
    assert_eq!(ids(&view.records), vec!["ST-12", "CD-7"]);
    assert_eq!(view.error.as_deref(), Some("Failed to delete service ticket"));
    assert!(view.notice.is_none());
}

#[tokio::test]
async fn test_delete_network_failure_message() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    f.gateway
        .fail_mutations(GatewayError::Unreachable("connection reset".to_string()));
    f.controller.delete_request("CD-7").await.unwrap_err();
    assert_eq!(f.controller.view().error.as_deref(), Some(MSG_NETWORK));
    assert_eq!(f.controller.records().len(), 2);
}

// ========================
// Details
// ========================

fn metals() -> Vec<Metal> {
    vec![Metal {
        metal_id: 2,
        metal_type: "Gold".to_string(),
        metal_purity: "22K".to_string(),
    }]
}

#[tokio::test]
async fn test_details_resolve_metal_once() {
    let mut with_metal = design(7, "Anu", "Silva", "anu@example.com");
    with_metal.preferred_metal_id = Some(2);
    with_metal.image = Some("iVBORw0KGgo".to_string());
    let mut unknown = design(8, "Ravi", "Jay", "ravi@example.com");
    unknown.preferred_metal_id = Some(99);

    let mut gateway = FakeGateway::with_records(vec![], vec![with_metal, unknown]);
    gateway.metals = metals();
    let f = fixture(gateway);
    f.controller.load().await.unwrap();

    let details = f.controller.request_details("CD-7").await.unwrap();
    assert_eq!(details.metal_label.as_deref(), Some("Gold - 22K"));
    assert_eq!(details.images, vec!["data:image/png;base64,iVBORw0KGgo"]);
    assert_eq!(details.status_options, RequestKind::CustomDesign.statuses().to_vec());

    let details = f.controller.request_details("CD-8").await.unwrap();
    assert_eq!(details.metal_label.as_deref(), Some("Unknown metal"));

    let metal_calls = f
        .gateway
        .calls()
        .into_iter()
        .filter(|call| *call == Call::ListMetals)
        .count();
    assert_eq!(metal_calls, 1);
}

#[tokio::test]
async fn test_ticket_details_skip_metals() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();

    let details = f.controller.request_details("ST-12").await.unwrap();
    assert!(details.metal_label.is_none());
    assert!(details.images.is_empty());
    assert!(!f.gateway.calls().contains(&Call::ListMetals));
}

#[tokio::test]
async fn test_details_metal_lookup_failure_degrades() {
    let mut with_metal = design(7, "Anu", "Silva", "anu@example.com");
    with_metal.preferred_metal_id = Some(2);
    let gateway = FakeGateway::with_records(vec![], vec![with_metal]);
    *gateway.metals_error.lock().unwrap() = Some(GatewayError::ServerError {
        status: 500,
        message: "boom".to_string(),
    });
    let f = fixture(gateway);
    f.controller.load().await.unwrap();

    let details = f.controller.request_details("CD-7").await.unwrap();
    assert_eq!(details.metal_label.as_deref(), Some("Unknown metal"));
    assert!(f.session.current().is_some());
}

#[tokio::test]
async fn test_details_metal_lookup_unauthorized_clears_session() {
    let mut with_metal = design(7, "Anu", "Silva", "anu@example.com");
    with_metal.preferred_metal_id = Some(2);
    let gateway = FakeGateway::with_records(vec![], vec![with_metal]);
    *gateway.metals_error.lock().unwrap() = Some(GatewayError::Unauthorized);
    let f = fixture(gateway);
    f.controller.load().await.unwrap();

    let err = f.controller.request_details("CD-7").await.unwrap_err();
    assert!(err.is_auth_failure());
    assert!(f.controller.view().login_required);
    assert!(f.session.current().is_none());
}

#[tokio::test]
async fn test_details_unknown_id() {
    let f = fixture(scenario_gateway());
    f.controller.load().await.unwrap();
    let err = f.controller.request_details("CD-404").await.unwrap_err();
    assert_eq!(err, ControllerError::Domain(DomainError::NotFound("CD-404".to_string())));
}
