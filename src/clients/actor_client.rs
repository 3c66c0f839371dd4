use crate::framework::{ActorEntity, FrameworkError, ResourceChange, ResourceClient};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Trait for table-specific clients to inherit standard operations.
///
/// This trait reduces boilerplate by providing default implementations for
/// common operations like `get` and `delete`.
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The table-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the table-specific error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Fetch a row by ID.
    #[tracing::instrument(skip(self))]
    async fn get(&self, id: T::Id) -> Result<Option<T>, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().get(id).await.map_err(Self::map_error)
    }

    /// Delete a row by ID, without any permission check.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<(), Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// Subscribe to the table's realtime change feed.
    async fn subscribe(&self) -> Result<broadcast::Receiver<ResourceChange<T::Id>>, Self::Error> {
        self.inner().subscribe().await.map_err(Self::map_error)
    }
}

/// Recovers a table's own error from a [`FrameworkError`].
///
/// Hook failures come back boxed; if the box holds an `E` it is returned as is,
/// so callers can match on e.g. `MenuError::UnknownCategory` directly.
pub fn recover_error<E>(e: FrameworkError, not_found: impl FnOnce(String) -> E) -> E
where
    E: std::error::Error + From<String> + 'static,
{
    match e {
        FrameworkError::NotFound(id) => not_found(id),
        FrameworkError::EntityError(inner) => match inner.downcast::<E>() {
            Ok(own) => *own,
            Err(other) => E::from(other.to_string()),
        },
        other => E::from(other.to_string()),
    }
}
