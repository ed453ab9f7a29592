//! Gateway trait
//!
//! One method per backend operation. Every call receives the session
//! explicitly; implementations attach its token as a bearer credential.

use async_trait::async_trait;

use super::error::GatewayResult;
use crate::domain::{CustomDesign, Metal, RequestStatus, ServiceTicket, UnifiedRequest};
use crate::session::Session;

#[async_trait]
pub trait RequestGateway: Send + Sync {
    async fn list_service_tickets(&self, session: &Session) -> GatewayResult<Vec<ServiceTicket>>;

    async fn list_custom_designs(&self, session: &Session) -> GatewayResult<Vec<CustomDesign>>;

    /// PUT the record's full raw payload with `status` applied
    async fn update_status(
        &self,
        session: &Session,
        record: &UnifiedRequest,
        status: RequestStatus,
    ) -> GatewayResult<()>;

    async fn delete_request(&self, session: &Session, record: &UnifiedRequest) -> GatewayResult<()>;

    async fn list_metals(&self, session: &Session) -> GatewayResult<Vec<Metal>>;

    /// Both lists, fetched concurrently; the first failure wins
    async fn list_requests(
        &self,
        session: &Session,
    ) -> GatewayResult<(Vec<ServiceTicket>, Vec<CustomDesign>)> {
        tokio::try_join!(
            self.list_service_tickets(session),
            self.list_custom_designs(session)
        )
    }
}
