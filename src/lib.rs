//! Kalyani Admin Core
//!
//! Layered architecture:
//! - domain: backend records, the unified request model and the adapters between them
//! - store: in-memory request collection with filtering and confirmed mutations
//! - gateway: REST backend access (service tickets, custom designs, metals)
//! - session: injectable session providers
//! - controller: view controller sequencing loads and mutations for presentation
//! - config: base URL, session and log locations

pub mod config;
pub mod controller;
pub mod domain;
pub mod gateway;
pub mod session;
pub mod store;

pub use config::{AdminConfig, ConfigError};
pub use controller::{ControllerError, ControllerResult, RequestDetails, RequestsController, ViewState};
pub use domain::{
    CustomDesign, Customer, DomainError, DomainResult, Metal, RawRecord, RequestKind,
    RequestStatus, ServiceTicket, UnifiedRequest,
};
pub use gateway::{GatewayError, GatewayResult, HttpGateway, RequestGateway};
pub use session::{FileSession, MemorySession, Session, SessionProvider};
pub use store::{KindCounts, KindFilter, RequestStore};
