use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::api::{OrderApi, RemoteError};
use crate::clients::OrderClient;
use crate::config::AdminConfig;
use crate::context::Session;

/// Owns the order actor for one operator session.
///
/// Built from [`AdminConfig`]: the HTTP client, the actor in front of it and
/// the [`OrderClient`] views talk to.
pub struct AdminSystem {
    pub order_client: OrderClient,
    session: Session,
    handle: tokio::task::JoinHandle<()>,
}

impl AdminSystem {
    pub fn new(config: &AdminConfig) -> Result<Self, RemoteError> {
        let session = Session::new(config.token.clone());
        let api = OrderApi::new(&config.base_url, session.clone(), config.timeout)?;

        let (order_actor, order_resource_client) = ResourceActor::new(32, api);
        let order_client = OrderClient::new(order_resource_client);
        let handle = tokio::spawn(order_actor.run());

        info!(base_url = %config.base_url, signed_in = session.is_authenticated(), "Admin system started");
        Ok(Self {
            order_client,
            session,
            handle,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Drops the client and waits for the actor to drain outstanding calls.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.order_client);

        if let Err(e) = self.handle.await {
            error!("Actor task failed: {:?}", e);
            return Err(format!("Actor task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
