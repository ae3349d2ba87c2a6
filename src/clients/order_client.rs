use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::actor_framework::ResourceClient;
use crate::context::Confirmed;
use crate::domain::{Order, OrderStatus};
use crate::order_actor::{
    validate_transition, OrderAction, OrderError, OrderQuery, PermissivePolicy, StatusUpdate,
    TransitionError, TransitionPolicy,
};

/// Client for interacting with the Order actor.
///
/// Status changes are validated here, before anything reaches the actor. Cancel
/// and quick-confirm require a [`Confirmed`] token from the operator.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    policy: Arc<dyn TransitionPolicy>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self::with_policy(inner, Arc::new(PermissivePolicy))
    }

    pub fn with_policy(inner: ResourceClient<Order>, policy: Arc<dyn TransitionPolicy>) -> Self {
        Self { inner, policy }
    }

    #[instrument(skip(self))]
    pub async fn list_orders(&self, query: OrderQuery) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        Ok(self.inner.list(query).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: String) -> Result<Order, OrderError> {
        debug!("Sending request");
        Ok(self.inner.fetch(id).await?)
    }

    /// Copy of the order from the last fetch in this session, if any.
    #[instrument(skip(self))]
    pub async fn cached_order(&self, id: String) -> Result<Option<Order>, OrderError> {
        Ok(self.inner.cached(id).await?)
    }

    /// Statuses the operator may choose for `order`, in canonical order.
    pub fn status_options(&self, order: &Order) -> Vec<OrderStatus> {
        self.policy.next_statuses(order.known_status())
    }

    /// Moves `order` to the status named by `target`.
    ///
    /// An empty target, or one equal to the current status, is rejected without
    /// sending anything.
    #[instrument(skip(self, order), fields(order_id = %order.id, current = %order.status))]
    pub async fn update_status(&self, order: &Order, target: &str) -> Result<Order, OrderError> {
        let status = validate_transition(self.policy.as_ref(), &order.status, target)
            .inspect_err(|e| debug!(error = %e, "Status change rejected locally"))?;

        debug!("Sending request");
        let updated = self
            .inner
            .update(order.id.clone(), StatusUpdate { status })
            .await
            .inspect_err(|e| warn!(error = %e, "Status change failed"))?;
        info!(status = %status, "Status updated");
        Ok(updated)
    }

    /// Quick action for a pending order: move it to `confirmed`.
    #[instrument(skip(self, order, _confirmed), fields(order_id = %order.id))]
    pub async fn confirm_order(&self, order: &Order, _confirmed: Confirmed) -> Result<Order, OrderError> {
        if order.known_status() != Some(OrderStatus::Pending) {
            return Err(TransitionError::NotPending(order.status.clone()).into());
        }
        self.update_status(order, OrderStatus::Confirmed.as_str()).await
    }

    /// Cancels the order through the dedicated cancel action.
    ///
    /// Already-cancelled orders are not short-circuited; the service decides.
    #[instrument(skip(self, _confirmed))]
    pub async fn cancel_order(&self, id: String, _confirmed: Confirmed) -> Result<Order, OrderError> {
        debug!("Sending request");
        let cancelled = self
            .inner
            .perform_action(id, OrderAction::Cancel)
            .await
            .inspect_err(|e| warn!(error = %e, "Cancellation failed"))?;
        info!("Order cancelled");
        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::{FrameworkError, ResourceRequest};
    use crate::api::RemoteError;
    use crate::mock_framework::{
        assert_no_request, confirmed, create_mock_client, expect_action, expect_list,
        expect_update, InMemoryOrderStore, StoreCall,
    };
    use crate::order_actor::SortOrder;
    use rust_decimal_macros::dec;
    use crate::domain::LineItem;

    fn pending_order() -> Order {
        Order::new("o1", OrderStatus::Pending)
            .with_items(vec![LineItem::new(dec!(100000), 2)])
            .with_shipping_fee(dec!(30000))
    }

    #[tokio::test]
    async fn same_or_empty_target_sends_nothing() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let order = pending_order();

        assert_eq!(
            client.update_status(&order, "pending").await,
            Err(OrderError::Validation(TransitionError::Unchanged(OrderStatus::Pending)))
        );
        assert_eq!(
            client.update_status(&order, "").await,
            Err(OrderError::Validation(TransitionError::NoStatusSelected))
        );
        assert_no_request(&mut receiver);
    }

    #[tokio::test]
    async fn valid_target_is_sent_as_status_update() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let order = pending_order();

        let task = {
            let client = client.clone();
            let order = order.clone();
            tokio::spawn(async move { client.update_status(&order, "packing").await })
        };

        let (id, patch, responder) = expect_update(&mut receiver).await.expect("Expected Update");
        assert_eq!(id, "o1");
        assert_eq!(patch.status, OrderStatus::Packing);
        let mut updated = order.clone();
        updated.status = "packing".into();
        responder.send(Ok(updated.clone())).unwrap();

        assert_eq!(task.await.unwrap(), Ok(updated));
    }

    #[tokio::test]
    async fn remote_failure_is_a_service_error() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let order = pending_order();

        let task = tokio::spawn(async move { client.update_status(&order, "refunded").await });
        let (_, _, responder) = expect_update(&mut receiver).await.expect("Expected Update");
        responder
            .send(Err(FrameworkError::Remote(RemoteError::Transport("reset".into()))))
            .unwrap();

        assert!(matches!(task.await.unwrap(), Err(OrderError::ServiceError(_))));
    }

    #[tokio::test]
    async fn cancel_goes_through_the_dedicated_action() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);

        let task = tokio::spawn(async move { client.cancel_order("o1".into(), confirmed()).await });

        let (id, action, responder) = expect_action(&mut receiver).await.expect("Expected Action");
        assert_eq!(id, "o1");
        assert_eq!(action, OrderAction::Cancel);
        responder.send(Ok(Order::new("o1", OrderStatus::Cancelled))).unwrap();

        assert_eq!(task.await.unwrap().unwrap().status, "cancelled");
    }

    #[tokio::test]
    async fn quick_confirm_only_applies_to_pending_orders() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let shipped = Order::new("o2", OrderStatus::InTransit);

        assert_eq!(
            client.confirm_order(&shipped, confirmed()).await,
            Err(OrderError::Validation(TransitionError::NotPending("in_transit".into())))
        );
        assert_no_request(&mut receiver);

        let task = {
            let client = client.clone();
            tokio::spawn(async move { client.confirm_order(&pending_order(), confirmed()).await })
        };
        match receiver.recv().await {
            Some(ResourceRequest::Update { patch, respond_to, .. }) => {
                assert_eq!(patch.status, OrderStatus::Confirmed);
                respond_to.send(Ok(Order::new("o1", OrderStatus::Confirmed))).unwrap();
            }
            other => panic!("Unexpected request: {:?}", other),
        }
        assert!(task.await.unwrap().is_ok());
    }

    #[test]
    fn options_come_from_the_policy() {
        let (inner, _receiver) = create_mock_client::<Order>(1);
        let client = OrderClient::new(inner);
        assert_eq!(client.status_options(&pending_order()), OrderStatus::ALL.to_vec());
    }

    /// Offers only the statuses that follow the current one in the vocabulary.
    struct ForwardOnly;

    impl TransitionPolicy for ForwardOnly {
        fn next_statuses(&self, current: Option<OrderStatus>) -> Vec<OrderStatus> {
            let start = current
                .and_then(|c| OrderStatus::ALL.iter().position(|s| *s == c))
                .map_or(0, |i| i + 1);
            OrderStatus::ALL[start..].to_vec()
        }
    }

    #[tokio::test]
    async fn restrictive_policy_blocks_backward_moves() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::with_policy(inner, Arc::new(ForwardOnly));
        let delivered = Order::new("o3", OrderStatus::Delivered);

        let options = client.status_options(&delivered);
        assert_eq!(options.first(), Some(&OrderStatus::Completed));
        assert!(!options.contains(&OrderStatus::Pending));

        assert!(matches!(
            client.update_status(&delivered, "pending").await,
            Err(OrderError::Validation(TransitionError::NotAllowed { .. }))
        ));
        assert_no_request(&mut receiver);
    }

    #[tokio::test]
    async fn list_forwards_the_query() {
        let (inner, mut receiver) = create_mock_client::<Order>(10);
        let client = OrderClient::new(inner);
        let query = OrderQuery {
            status: Some(OrderStatus::Returning),
            sort: SortOrder::Asc,
        };

        let task = {
            let query = query.clone();
            tokio::spawn(async move { client.list_orders(query).await })
        };
        let (sent, responder) = expect_list(&mut receiver).await.expect("Expected List");
        assert_eq!(sent, query);
        responder.send(Ok(vec![Order::new("o4", OrderStatus::Returning)])).unwrap();

        assert_eq!(task.await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn cached_order_reflects_last_fetch_without_a_call() {
        let store = InMemoryOrderStore::with_orders([pending_order()]);
        let client = store.spawn_client();

        assert_eq!(client.cached_order("o1".into()).await, Ok(None));
        client.get_order("o1".into()).await.unwrap();
        let cached = client.cached_order("o1".into()).await.unwrap();
        assert_eq!(cached.map(|o| o.status), Some("pending".to_string()));
        assert_eq!(store.calls(), vec![StoreCall::Fetch("o1".into())]);
    }
}
