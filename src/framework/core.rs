//! # Core Table Framework
//!
//! This module defines the generic building blocks behind every table of the
//! restaurant data store.
//!
//! ## Key Types
//!
//! - [`ActorEntity`]: The trait that every row type must implement.
//! - [`ResourceActor`]: The generic actor that owns the rows of one table.
//! - [`ResourceClient`]: The generic client for talking to a table.
//! - [`ResourceChange`]: Realtime change notifications published by a table.
//! - [`FrameworkError`]: Common errors (e.g., ActorClosed, NotFound).

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info, warn};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, DTOs, and Actions)
// =============================================================================

/// Trait that any row type must implement to be stored in a [`ResourceActor`].
///
/// # Architecture Note
/// By defining a contract (`ActorEntity`) that all our row types (MenuItem, Order,
/// Reservation, ...) must satisfy, we write the table logic *once* and reuse it
/// for every collection of the data store.
///
/// Associated types keep the tables apart at compile time: an `Order` table only
/// accepts `OrderCreate` payloads, and a `Reservation` table cannot be sent one.
///
/// # Async & Context
/// Hooks are `#[async_trait]` so they can call other tables (e.g. a menu item
/// checking that its category exists). The `Context` type is injected into every
/// hook by [`ResourceActor::run`], which lets tables be wired together after they
/// have all been constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// The unique identifier for this row (e.g., String, Uuid, u64).
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The data required to insert a new row.
    type Create: Send + Sync + Debug;

    /// The data required to update an existing row.
    type Update: Send + Sync + Debug;

    /// Enum representing row-specific operations (e.g., a status transition).
    type Action: Send + Sync + Debug;

    /// The result type returned by custom actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into the table.
    /// Use `()` if no dependencies are needed.
    type Context: Send + Sync;

    /// The error type for this row.
    ///
    /// One enum per table rather than one per operation: callers match on a
    /// single error type no matter which request failed.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Construct the full row from the generated ID and the payload.
    /// This is called synchronously before `on_create`.
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the row is constructed and before it is stored.
    /// Returning an error rejects the insert.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called when an update request is received.
    async fn on_update(
        &mut self,
        update: Self::Update,
        _ctx: &Self::Context,
    ) -> Result<(), Self::Error>;

    /// Called immediately before the row is removed from the table.
    async fn on_delete(&self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Handle a custom row-specific action.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        _ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES & ERRORS
// =============================================================================

/// Errors that can occur within the table framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    fn entity<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        FrameworkError::EntityError(Box::new(error))
    }
}

/// Type alias for the one-shot response channel used by tables.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Row predicate used by [`ResourceRequest::List`] (the `select ... where` of a table).
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Realtime change feed entry, published after a mutation has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange<Id> {
    Inserted(Id),
    Updated(Id),
    Deleted(Id),
}

/// Internal message type sent to a table.
///
/// # The CRUD Pattern
/// The variants map onto the data-access contract of a hosted relational store:
///
/// - **Create** / **CreateBatch**: `insert`. A batch is all-or-nothing: every row is
///   validated before any of them is stored.
/// - **Get** / **List**: `select` by primary key or by predicate.
/// - **Update**: partial update of one row.
/// - **Delete**: removal of one row.
/// - **Action**: row-specific operations that don't fit the CRUD model.
/// - **Subscribe**: realtime notifications of every change to the table.
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    CreateBatch {
        params: Vec<T::Create>,
        respond_to: Response<Vec<T::Id>>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        filter: Filter<T>,
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        update: T::Update,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    Subscribe {
        respond_to: Response<broadcast::Receiver<ResourceChange<T::Id>>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// The generic actor that owns the rows of one table.
///
/// # Architecture Note
/// This struct is the "Server" half of the table. It owns the rows (`store`) and
/// the receiver end of the channel.
///
/// **Concurrency Model**:
/// Every table processes its requests *sequentially* in its own task, so the
/// `store` needs no `Mutex` or `RwLock`. Separate tables run in parallel.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
    changes: broadcast::Sender<ResourceChange<T::Id>>,
}

impl<T: ActorEntity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size.max(1));
        let (changes, _) = broadcast::channel(buffer_size.max(1));
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
            changes,
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    /// Runs the table's event loop, processing messages until the channel closes.
    ///
    /// # Context Injection
    /// The `context` argument is handed to every row hook. This lets rows reach
    /// other tables whose clients were created *after* this actor was constructed
    /// but *before* the loop started.
    pub async fn run(mut self, context: T::Context) {
        // Extract just the type name (e.g., "Order" instead of "bistro::model::order::Order")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(entity_type, "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    debug!(entity_type, ?params, "Create");
                    let id = (self.next_id_fn)();
                    let result = match T::from_create_params(id.clone(), params) {
                        Ok(mut item) => match item.on_create(&context).await {
                            Ok(()) => {
                                self.store.insert(id.clone(), item);
                                info!(entity_type, %id, size = self.store.len(), "Created");
                                self.publish(ResourceChange::Inserted(id.clone()));
                                Ok(id)
                            }
                            Err(e) => {
                                warn!(entity_type, error = %e, "on_create failed");
                                Err(FrameworkError::entity(e))
                            }
                        },
                        Err(e) => {
                            warn!(entity_type, error = %e, "Create failed");
                            Err(FrameworkError::entity(e))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::CreateBatch { params, respond_to } => {
                    debug!(entity_type, count = params.len(), "CreateBatch");
                    let result = self.create_batch(params, &context).await;
                    match &result {
                        Ok(ids) => {
                            info!(entity_type, count = ids.len(), size = self.store.len(), "Batch created");
                        }
                        Err(e) => warn!(entity_type, error = %e, "Batch rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let found = item.is_some();
                    debug!(entity_type, %id, found, "Get");
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { filter, respond_to } => {
                    let rows: Vec<T> = self
                        .store
                        .values()
                        .filter(|row| filter(row))
                        .cloned()
                        .collect();
                    debug!(entity_type, matched = rows.len(), "List");
                    let _ = respond_to.send(Ok(rows));
                }
                ResourceRequest::Update {
                    id,
                    update,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?update, "Update");
                    let result = match self.store.get(&id) {
                        Some(current) => {
                            // Mutate a copy so a rejected update leaves the row untouched.
                            let mut item = current.clone();
                            match item.on_update(update, &context).await {
                                Ok(()) => {
                                    self.store.insert(id.clone(), item.clone());
                                    info!(entity_type, %id, "Updated");
                                    self.publish(ResourceChange::Updated(id.clone()));
                                    Ok(item)
                                }
                                Err(e) => {
                                    warn!(entity_type, %id, error = %e, "Update failed");
                                    Err(FrameworkError::entity(e))
                                }
                            }
                        }
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Delete { id, respond_to } => {
                    debug!(entity_type, %id, "Delete");
                    let result = match self.store.get(&id) {
                        Some(item) => match item.on_delete(&context).await {
                            Ok(()) => {
                                self.store.remove(&id);
                                info!(entity_type, %id, size = self.store.len(), "Deleted");
                                self.publish(ResourceChange::Deleted(id.clone()));
                                Ok(())
                            }
                            Err(e) => {
                                warn!(entity_type, %id, error = %e, "on_delete failed");
                                Err(FrameworkError::entity(e))
                            }
                        },
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    debug!(entity_type, %id, ?action, "Action");
                    let result = match self.store.get(&id) {
                        Some(current) => {
                            let mut item = current.clone();
                            match item.handle_action(action, &context).await {
                                Ok(outcome) => {
                                    self.store.insert(id.clone(), item);
                                    info!(entity_type, %id, "Action ok");
                                    self.publish(ResourceChange::Updated(id.clone()));
                                    Ok(outcome)
                                }
                                Err(e) => {
                                    warn!(entity_type, %id, error = %e, "Action failed");
                                    Err(FrameworkError::entity(e))
                                }
                            }
                        }
                        None => {
                            warn!(entity_type, %id, "Not found");
                            Err(FrameworkError::NotFound(id.to_string()))
                        }
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Subscribe { respond_to } => {
                    debug!(entity_type, subscribers = self.changes.receiver_count() + 1, "Subscribe");
                    let _ = respond_to.send(Ok(self.changes.subscribe()));
                }
            }
        }

        info!(entity_type, size = self.store.len(), "Shutdown");
    }

    /// Builds and validates every row of a batch before storing any of them.
    async fn create_batch(
        &mut self,
        params: Vec<T::Create>,
        context: &T::Context,
    ) -> Result<Vec<T::Id>, FrameworkError> {
        let mut staged = Vec::with_capacity(params.len());
        for payload in params {
            let id = (self.next_id_fn)();
            let mut item = T::from_create_params(id.clone(), payload).map_err(FrameworkError::entity)?;
            item.on_create(context).await.map_err(FrameworkError::entity)?;
            staged.push((id, item));
        }

        let mut ids = Vec::with_capacity(staged.len());
        for (id, item) in staged {
            self.store.insert(id.clone(), item);
            self.publish(ResourceChange::Inserted(id.clone()));
            ids.push(id);
        }
        Ok(ids)
    }

    fn publish(&self, change: ResourceChange<T::Id>) {
        // No subscribers is the normal case outside admin surfaces.
        let _ = self.changes.send(change);
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

/// A type-safe client for interacting with a `ResourceActor`.
///
/// Holds only a sender, so cloning is cheap and clones can be shared across tasks.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
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

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn create_batch(&self, params: Vec<T::Create>) -> Result<Vec<T::Id>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::CreateBatch { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn list(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<T>, FrameworkError> {
        let filter: Filter<T> = Box::new(filter);
        self.request(|respond_to| ResourceRequest::List { filter, respond_to })
            .await
    }

    pub async fn update(&self, id: T::Id, update: T::Update) -> Result<T, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Update {
            id,
            update,
            respond_to,
        })
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }

    pub async fn subscribe(
        &self,
    ) -> Result<broadcast::Receiver<ResourceChange<T::Id>>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Subscribe { respond_to })
            .await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
