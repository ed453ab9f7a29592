//! Remote Sync Gateway
//!
//! Backend access for service tickets, custom designs and metals.
//! Implementations classify failures; none of them retry.

mod error;
mod http;
mod traits;

pub use error::{GatewayError, GatewayResult};
pub use http::{HttpGateway, CUSTOM_DESIGNS_PATH, METALS_PATH, SERVICE_TICKETS_PATH};
pub use traits::RequestGateway;
