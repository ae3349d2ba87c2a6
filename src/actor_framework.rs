use std::collections::{HashMap, HashSet};
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument, warn, Instrument};

use crate::api::RemoteError;

// =============================================================================
// 1. THE ABSTRACTION (Entities and the remote store behind them)
// =============================================================================

/// Trait that any remotely owned entity must implement to be fronted by ResourceActor
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + 'static;
    type Query: Send + Sync + Debug + 'static;
    type Patch: Send + Sync + Debug + 'static;

    /// Domain-specific mutation that has its own endpoint
    type Action: Send + Sync + Debug + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;
}

/// The service that owns the entities. This side only reads and requests mutations.
#[async_trait]
pub trait RemoteStore<T: Entity>: Send + Sync + 'static {
    async fn fetch(&self, id: &T::Id) -> Result<T, RemoteError>;
    async fn fetch_all(&self, query: &T::Query) -> Result<Vec<T>, RemoteError>;
    async fn update(&self, id: &T::Id, patch: &T::Patch) -> Result<T, RemoteError>;
    async fn perform(&self, id: &T::Id, action: &T::Action) -> Result<T, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameworkError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("A change is already in flight for {0}")]
    Busy(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Fetch {
        id: T::Id,
        respond_to: Response<T>,
    },
    List {
        query: T::Query,
        respond_to: Response<Vec<T>>,
    },
    /// Last copy seen in this session, without a remote call.
    Cached {
        id: T::Id,
        respond_to: oneshot::Sender<Option<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T>,
    },
}

/// Outcome of a remote call, posted back to the actor by the task that ran it.
enum Settlement<T: Entity> {
    Fetched {
        id: T::Id,
        result: Result<T, RemoteError>,
        respond_to: Response<T>,
    },
    Listed {
        result: Result<Vec<T>, RemoteError>,
        respond_to: Response<Vec<T>>,
    },
    Mutated {
        id: T::Id,
        result: Result<T, RemoteError>,
        respond_to: Response<T>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Per-session state for one entity type.
///
/// Remote calls run as their own tasks so a slow request never blocks the
/// others. Fetches replace what is cached. Only one mutation per entity may
/// be outstanding; a second one is refused with [`FrameworkError::Busy`].
pub struct ResourceActor<T: Entity, S: RemoteStore<T>> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: Arc<S>,
    cache: HashMap<T::Id, T>,
    in_flight: HashSet<T::Id>,
    settled_tx: mpsc::UnboundedSender<Settlement<T>>,
    settled_rx: mpsc::UnboundedReceiver<Settlement<T>>,
    pending: usize,
}

impl<T: Entity, S: RemoteStore<T>> ResourceActor<T, S> {
    pub fn new(buffer_size: usize, store: S) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (settled_tx, settled_rx) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            store: Arc::new(store),
            cache: HashMap::new(),
            in_flight: HashSet::new(),
            settled_tx,
            settled_rx,
            pending: 0,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Serves requests until every client is dropped and outstanding calls have settled.
    #[instrument(name = "resource_actor", skip(self))]
    pub async fn run(mut self) {
        info!("ResourceActor starting");
        let mut accepting = true;
        loop {
            tokio::select! {
                msg = self.receiver.recv(), if accepting => match msg {
                    Some(msg) => self.handle(msg),
                    None => {
                        debug!(pending = self.pending, "All clients gone, draining");
                        accepting = false;
                    }
                },
                Some(settlement) = self.settled_rx.recv(), if self.pending > 0 => {
                    self.settle(settlement);
                }
            }
            if !accepting && self.pending == 0 {
                break;
            }
        }
        info!("ResourceActor stopped");
    }

    fn handle(&mut self, msg: ResourceRequest<T>) {
        match msg {
            ResourceRequest::Fetch { id, respond_to } => {
                debug!(id = %id, "Fetching");
                self.spawn_remote(move |store, settled| async move {
                    let result = store.fetch(&id).await;
                    let _ = settled.send(Settlement::Fetched { id, result, respond_to });
                });
            }
            ResourceRequest::List { query, respond_to } => {
                debug!(query = ?query, "Listing");
                self.spawn_remote(move |store, settled| async move {
                    let result = store.fetch_all(&query).await;
                    let _ = settled.send(Settlement::Listed { result, respond_to });
                });
            }
            ResourceRequest::Cached { id, respond_to } => {
                let _ = respond_to.send(self.cache.get(&id).cloned());
            }
            ResourceRequest::Update { id, patch, respond_to } => {
                if !self.begin_mutation(&id) {
                    let _ = respond_to.send(Err(FrameworkError::Busy(id.to_string())));
                    return;
                }
                debug!(id = %id, patch = ?patch, "Updating");
                self.spawn_remote(move |store, settled| async move {
                    let result = store.update(&id, &patch).await;
                    let _ = settled.send(Settlement::Mutated { id, result, respond_to });
                });
            }
            ResourceRequest::Action { id, action, respond_to } => {
                if !self.begin_mutation(&id) {
                    let _ = respond_to.send(Err(FrameworkError::Busy(id.to_string())));
                    return;
                }
                debug!(id = %id, action = ?action, "Performing action");
                self.spawn_remote(move |store, settled| async move {
                    let result = store.perform(&id, &action).await;
                    let _ = settled.send(Settlement::Mutated { id, result, respond_to });
                });
            }
        }
    }

    /// Marks `id` as having a mutation in flight. Returns false if one already is.
    fn begin_mutation(&mut self, id: &T::Id) -> bool {
        if self.in_flight.contains(id) {
            warn!(id = %id, "Rejecting concurrent change");
            return false;
        }
        self.in_flight.insert(id.clone());
        true
    }

    fn spawn_remote<F, Fut>(&mut self, call: F)
    where
        F: FnOnce(Arc<S>, mpsc::UnboundedSender<Settlement<T>>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.pending += 1;
        let fut = call(Arc::clone(&self.store), self.settled_tx.clone());
        tokio::spawn(fut.in_current_span());
    }

    fn settle(&mut self, settlement: Settlement<T>) {
        self.pending -= 1;
        match settlement {
            Settlement::Fetched { id, result, respond_to } => {
                match &result {
                    Ok(item) => {
                        self.cache.insert(id, item.clone());
                    }
                    Err(RemoteError::NotFound(_)) => {
                        self.cache.remove(&id);
                    }
                    Err(e) => warn!(id = %id, error = %e, "Fetch failed"),
                }
                let _ = respond_to.send(result.map_err(FrameworkError::from));
            }
            Settlement::Listed { result, respond_to } => {
                match &result {
                    Ok(items) => {
                        self.cache = items
                            .iter()
                            .map(|item| (item.id().clone(), item.clone()))
                            .collect();
                        debug!(count = items.len(), "Cache replaced");
                    }
                    Err(e) => warn!(error = %e, "Listing failed"),
                }
                let _ = respond_to.send(result.map_err(FrameworkError::from));
            }
            Settlement::Mutated { id, result, respond_to } => {
                self.in_flight.remove(&id);
                match &result {
                    Ok(item) => {
                        info!(id = %id, "Change applied");
                        self.cache.insert(id, item.clone());
                    }
                    Err(e) => warn!(id = %id, error = %e, "Change failed"),
                }
                let _ = respond_to.send(result.map_err(FrameworkError::from));
            }
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn fetch(&self, id: T::Id) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Fetch { id, respond_to })
            .await
    }

    pub async fn list(&self, query: T::Query) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { query, respond_to })
            .await
    }

    pub async fn cached(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Cached { id, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to })
            .await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to })
            .await
    }
}

// =============================================================================
// 5. USAGE (Test)
// =============================================================================
