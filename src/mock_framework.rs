//! # Mock Framework
//!
//! Utilities for testing clients and views in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers like
//! [`expect_update`] or [`expect_action`] to assert what reached the actor.
//! [`InMemoryOrderStore`] stands in for the remote service when a real actor
//! is wanted, and [`RecordingOperator`] captures prompts and alerts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use crate::actor_framework::{Entity, RemoteStore, ResourceActor, ResourceClient, ResourceRequest, Response};
use crate::api::RemoteError;
use crate::clients::OrderClient;
use crate::context::{AdminContext, AdminEvent, AlertLevel, Confirmed, Operator, Route, Session};
use crate::domain::{Order, OrderStatus};
use crate::order_actor::{OrderAction, OrderQuery, SortOrder, StatusUpdate};

/// Creates a mock client and a receiver for asserting requests.
///
/// # Testing Strategy
/// Instead of spinning up a `ResourceActor`, the client sends to a channel the
/// test owns. The test inspects each request and answers through its
/// `respond_to`, simulating success or failure deterministically.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Fetch request
pub async fn expect_fetch<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Fetch { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Query, Response<Vec<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::List { query, respond_to }) => Some((query, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Update request
pub async fn expect_update<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, T::Patch, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Update { id, patch, respond_to }) => Some((id, patch, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Action request
pub async fn expect_action<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, T::Action, Response<T>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Fails the test if any request is waiting on the channel.
pub fn assert_no_request<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) {
    if let Ok(request) = receiver.try_recv() {
        panic!("Expected no request, got {:?}", request);
    }
}

/// A confirmation token, as if the operator had said yes.
pub fn confirmed() -> Confirmed {
    AdminContext::new(Session::default(), Arc::new(RecordingOperator::answering(true)))
        .confirm("test")
        .expect("operator answers yes")
}

// =============================================================================
// Operator double
// =============================================================================

/// Operator that answers every prompt the same way and records everything.
#[derive(Debug, Default)]
pub struct RecordingOperator {
    answer: bool,
    prompts: Mutex<Vec<String>>,
    events: Mutex<Vec<AdminEvent>>,
}

impl RecordingOperator {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            ..Self::default()
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<AdminEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn alerts(&self, level: AlertLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AdminEvent::Alert { level: l, message } if l == level => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn navigations(&self) -> Vec<Route> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                AdminEvent::Navigate(route) => Some(route),
                _ => None,
            })
            .collect()
    }

    pub fn statistics_refreshes(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| **event == AdminEvent::StatisticsChanged)
            .count()
    }
}

impl Operator for RecordingOperator {
    fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }

    fn emit(&self, event: AdminEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// =============================================================================
// Remote service double
// =============================================================================

/// Remote calls seen by [`InMemoryOrderStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Fetch(String),
    List(OrderQuery),
    Update(String, OrderStatus),
    Cancel(String),
}

/// Holds mutations inside the store until released.
#[derive(Debug, Clone, Default)]
pub struct MutationGate {
    /// Notified when a mutation reaches the store.
    pub started: Arc<Notify>,
    /// Notify once per held mutation to let it complete.
    pub release: Arc<Notify>,
}

/// In-memory order service. Cloning shares state.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<Mutex<HashMap<String, Order>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    failure: Arc<Mutex<Option<RemoteError>>>,
    gate: Arc<Mutex<Option<MutationGate>>>,
}

impl InMemoryOrderStore {
    pub fn with_orders(orders: impl IntoIterator<Item = Order>) -> Self {
        let store = Self::default();
        {
            let mut map = store.orders.lock().unwrap();
            for order in orders {
                map.insert(order.id.clone(), order);
            }
        }
        store
    }

    /// Every following call fails with `error` until [`InMemoryOrderStore::recover`].
    pub fn fail_with(&self, error: RemoteError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Every following update or cancel waits on the returned gate.
    pub fn gate_mutations(&self) -> MutationGate {
        let gate = MutationGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn order(&self, id: &str) -> Option<Order> {
        self.orders.lock().unwrap().get(id).cloned()
    }

    /// Spawns a real actor over this store and returns a client for it.
    pub fn spawn_client(&self) -> OrderClient {
        let (actor, inner) = ResourceActor::new(16, self.clone());
        tokio::spawn(actor.run());
        OrderClient::new(inner)
    }

    fn record(&self, call: StoreCall) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(call);
        match self.failure.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
    }

    fn set_status(&self, id: &str, status: OrderStatus) -> Result<Order, RemoteError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        order.status = status.as_str().to_string();
        Ok(order.clone())
    }
}

#[async_trait]
impl RemoteStore<Order> for InMemoryOrderStore {
    async fn fetch(&self, id: &String) -> Result<Order, RemoteError> {
        self.record(StoreCall::Fetch(id.clone()))?;
        self.order(id).ok_or_else(|| RemoteError::NotFound(id.clone()))
    }

    async fn fetch_all(&self, query: &OrderQuery) -> Result<Vec<Order>, RemoteError> {
        self.record(StoreCall::List(query.clone()))?;
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| query.status.map_or(true, |s| o.status == s.as_str()))
            .cloned()
            .collect();
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        if query.sort == SortOrder::Desc {
            orders.reverse();
        }
        Ok(orders)
    }

    async fn update(&self, id: &String, patch: &StatusUpdate) -> Result<Order, RemoteError> {
        self.record(StoreCall::Update(id.clone(), patch.status))?;
        self.pass_gate().await;
        self.set_status(id, patch.status)
    }

    async fn perform(&self, id: &String, action: &OrderAction) -> Result<Order, RemoteError> {
        match action {
            OrderAction::Cancel => {
                self.record(StoreCall::Cancel(id.clone()))?;
                self.pass_gate().await;
                self.set_status(id, OrderStatus::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Order>(10);

        let fetch_task = tokio::spawn(async move { client.fetch("o1".to_string()).await });

        let (id, responder) = expect_fetch(&mut receiver).await.expect("Expected Fetch request");
        assert_eq!(id, "o1");
        responder.send(Ok(Order::new("o1", OrderStatus::Pending))).unwrap();

        let result = fetch_task.await.unwrap();
        assert_eq!(result.unwrap().status, "pending");
    }

    #[tokio::test]
    async fn in_memory_store_filters_and_sorts() {
        let mut a = Order::new("a", OrderStatus::Pending);
        a.created_at = "2024-01-01T00:00:00Z".parse().ok();
        let mut b = Order::new("b", OrderStatus::Delivered);
        b.created_at = "2024-02-01T00:00:00Z".parse().ok();
        let mut c = Order::new("c", OrderStatus::Pending);
        c.created_at = "2024-03-01T00:00:00Z".parse().ok();
        let store = InMemoryOrderStore::with_orders([a, b, c]);

        let newest_first = store.fetch_all(&OrderQuery::default()).await.unwrap();
        let ids: Vec<&str> = newest_first.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);

        let pending = store
            .fetch_all(&OrderQuery { status: Some(OrderStatus::Pending), sort: SortOrder::Asc })
            .await
            .unwrap();
        let ids: Vec<&str> = pending.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }
}
