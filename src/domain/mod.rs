//! Domain Layer
//!
//! Backend records, the unified request view-model and the pure adapters
//! between them. No I/O happens here.

mod adapter;
mod design;
mod error;
mod kind;
mod metal;
mod request;
mod ticket;
mod wire;

pub use adapter::{from_custom_design, from_service_ticket, today, IMAGE_DATA_PREFIX, NO_DESCRIPTION};
pub use design::CustomDesign;
pub use error::{DomainError, DomainResult};
pub use kind::{RequestKind, RequestStatus};
pub use metal::{metal_label, Metal};
pub use request::{Customer, RawRecord, UnifiedRequest};
pub use ticket::ServiceTicket;
