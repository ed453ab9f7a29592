//! Resource Adapter
//!
//! Pure conversions from backend records to `UnifiedRequest`. The caller
//! passes its own `today`, used when a record carries no usable date.

use chrono::NaiveDate;

use super::design::CustomDesign;
use super::kind::RequestKind;
use super::request::{Customer, RawRecord, UnifiedRequest};
use super::ticket::ServiceTicket;

pub const NO_DESCRIPTION: &str = "No description provided";
pub const IMAGE_DATA_PREFIX: &str = "data:image/png;base64,";

/// The caller's calendar date
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn from_service_ticket(ticket: &ServiceTicket, today: NaiveDate) -> UnifiedRequest {
    let note = ticket
        .note
        .as_deref()
        .map(str::trim)
        .filter(|note| !note.is_empty());

    UnifiedRequest {
        id: UnifiedRequest::unified_id(RequestKind::ServiceTicket, ticket.service_id),
        kind: RequestKind::ServiceTicket,
        customer: Customer::new(
            &ticket.customer_fname,
            &ticket.customer_lname,
            &ticket.email,
            &ticket.contact_number,
        ),
        subject: format!("{} Service Request", ticket.ticket_type),
        description: note.unwrap_or(NO_DESCRIPTION).to_string(),
        submitted_at: submitted_date(ticket.ticket_date.as_deref(), today),
        status: ticket.status,
        notes: note.map(str::to_string),
        raw: RawRecord::ServiceTicket(ticket.clone()),
    }
}

pub fn from_custom_design(design: &CustomDesign, today: NaiveDate) -> UnifiedRequest {
    let budget = match design.stated_budget() {
        Some(budget) => format!("LKR {}", budget),
        None => "Not specified".to_string(),
    };
    let (description, notes) = match design.preferred_metal_id {
        Some(metal_id) => (
            format!("Budget: {} | Metal ID: {}", budget, metal_id),
            format!("Budget: {} | Preferred Metal ID: {}", budget, metal_id),
        ),
        None => (format!("Budget: {}", budget), format!("Budget: {}", budget)),
    };

    let mut raw = design.clone();
    raw.image = design.image.as_deref().and_then(embedded_image);

    UnifiedRequest {
        id: UnifiedRequest::unified_id(RequestKind::CustomDesign, design.design_id),
        kind: RequestKind::CustomDesign,
        customer: Customer::new(
            &design.customer_fname,
            &design.customer_lname,
            &design.email,
            &design.contact_number,
        ),
        subject: "Custom Design Request".to_string(),
        description,
        submitted_at: submitted_date(design.ticket_date.as_deref(), today),
        status: design.status,
        notes: Some(notes),
        raw: RawRecord::CustomDesign(raw),
    }
}

/// Date part of a backend timestamp, falling back to `today`
fn submitted_date(timestamp: Option<&str>, today: NaiveDate) -> NaiveDate {
    timestamp
        .and_then(|value| value.split('T').next())
        .and_then(|date| NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok())
        .unwrap_or(today)
}

/// Wrap a bare base64 payload as a PNG data URL
fn embedded_image(image: &str) -> Option<String> {
    let image = image.trim();
    if image.is_empty() {
        None
    } else if image.starts_with("data:") {
        Some(image.to_string())
    } else {
        Some(format!("{}{}", IMAGE_DATA_PREFIX, image))
    }
}
