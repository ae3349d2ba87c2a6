use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument, warn};

use super::envelope::{error_message, Envelope};
use super::error::RemoteError;
use crate::actor_framework::RemoteStore;
use crate::context::Session;
use crate::domain::{Order, OrderStatus};
use crate::order_actor::{OrderAction, OrderQuery, StatusUpdate};

/// HTTP client for the remote order service.
///
/// The bearer token comes from the [`Session`]; it is never logged.
#[derive(Debug, Clone)]
pub struct OrderApi {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl OrderApi {
    pub fn new(
        base_url: impl Into<String>,
        session: Session,
        timeout: Duration,
    ) -> Result<Self, RemoteError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RemoteError::Transport(format!("failed to build HTTP client: {}", e)))?;
        let base_url = base_url.into();
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| RemoteError::Transport(format!("invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Transport(format!("invalid base URL '{}'", base_url)));
        }
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Appends `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, RemoteError> {
        let token = self.session.bearer().ok_or(RemoteError::Unauthenticated)?;
        Ok(request.bearer_auth(token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        resource: &str,
    ) -> Result<Envelope<T>, RemoteError> {
        let response = self.authorized(request)?.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(resource.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Order service returned an error");
            return Err(RemoteError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// `GET /api/orders/admin/orders`; an empty status filter lists every order.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, RemoteError> {
        debug!("Sending request");
        let status = query.status.map(|s| s.as_str()).unwrap_or("");
        let request = self
            .http
            .get(self.url(&["api", "orders", "admin", "orders"]))
            .query(&[("status", status), ("sort", query.sort.as_str())]);
        self.send::<Vec<Order>>(request, "orders")
            .await?
            .into_data(|message| {
                RemoteError::Rejected(message.unwrap_or_else(|| "listing refused".to_string()))
            })
    }

    /// `GET /api/orders/admin/orders/{id}`; `success: false` means the order does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_order(&self, id: &str) -> Result<Order, RemoteError> {
        debug!("Sending request");
        let request = self.http.get(self.url(&["api", "orders", "admin", "orders", id]));
        self.send::<Order>(request, id)
            .await?
            .into_data(|_| RemoteError::NotFound(id.to_string()))
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> Result<Order, RemoteError> {
        debug!("Sending request");
        let request = self
            .http
            .put(self.url(&["api", "orders", id, "status"]))
            .json(&json!({ "status": status.as_str() }));
        self.send::<Order>(request, id).await?.into_data(|message| {
            RemoteError::Rejected(message.unwrap_or_else(|| "status update refused".to_string()))
        })
    }

    #[instrument(skip(self))]
    pub async fn cancel_order(&self, id: &str) -> Result<Order, RemoteError> {
        debug!("Sending request");
        let request = self
            .http
            .put(self.url(&["api", "orders", id, "cancel"]))
            .json(&json!({}));
        self.send::<Order>(request, id).await?.into_data(|message| {
            RemoteError::Rejected(message.unwrap_or_else(|| "cancellation refused".to_string()))
        })
    }
}

#[async_trait]
impl RemoteStore<Order> for OrderApi {
    async fn fetch(&self, id: &String) -> Result<Order, RemoteError> {
        self.fetch_order(id).await
    }

    async fn fetch_all(&self, query: &OrderQuery) -> Result<Vec<Order>, RemoteError> {
        self.list_orders(query).await
    }

    async fn update(&self, id: &String, patch: &StatusUpdate) -> Result<Order, RemoteError> {
        self.update_status(id, patch.status).await
    }

    async fn perform(&self, id: &String, action: &OrderAction) -> Result<Order, RemoteError> {
        match action {
            OrderAction::Cancel => self.cancel_order(id).await,
        }
    }
}
