use crate::clients::actor_client::{recover_error, ActorClient};
use crate::framework::{FrameworkError, ResourceClient};
use crate::menu_actor::MenuError;
use crate::model::{
    Category, CategoryCreate, CategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate, Session,
};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// How many featured dishes the landing page shows.
pub const FEATURED_LIMIT: usize = 3;

fn require_admin(session: &Session) -> Result<(), MenuError> {
    if !session.is_admin {
        warn!(user_id = %session.user_id, "Menu change refused for non-admin");
        return Err(MenuError::AdminRequired);
    }
    Ok(())
}

// =============================================================================
// Menu items
// =============================================================================

/// Client for the menu items table.
///
/// Reads are open to everyone; every mutation takes the caller's [`Session`] and
/// is refused unless it belongs to an admin.
#[derive(Clone)]
pub struct MenuClient {
    inner: ResourceClient<MenuItem>,
}

impl MenuClient {
    pub fn new(inner: ResourceClient<MenuItem>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, session, params), fields(name = %params.name))]
    pub async fn create_item(&self, session: &Session, params: MenuItemCreate) -> Result<String, MenuError> {
        require_admin(session)?;
        debug!(?params, "create_item called");
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(%id, "Menu item created");
        Ok(id)
    }

    #[instrument(skip(self, session, update))]
    pub async fn update_item(
        &self,
        session: &Session,
        id: String,
        update: MenuItemUpdate,
    ) -> Result<MenuItem, MenuError> {
        require_admin(session)?;
        debug!(?update, "Sending request");
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    #[instrument(skip(self, session))]
    pub async fn delete_item(&self, session: &Session, id: String) -> Result<(), MenuError> {
        require_admin(session)?;
        ActorClient::delete(self, id).await
    }

    /// Every item, available or not, sorted by name (the admin view).
    pub async fn all_items(&self) -> Result<Vec<MenuItem>, MenuError> {
        let mut items = self.inner.list(|_| true).await.map_err(Self::map_error)?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// The storefront listing: available items, optionally narrowed to one
    /// category, sorted by name.
    pub async fn available_items(&self, category_id: Option<&str>) -> Result<Vec<MenuItem>, MenuError> {
        let category_id = category_id.map(str::to_string);
        let mut items = self
            .inner
            .list(move |item: &MenuItem| {
                item.is_available
                    && category_id
                        .as_ref()
                        .map_or(true, |wanted| item.category_id.as_ref() == Some(wanted))
            })
            .await
            .map_err(Self::map_error)?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    /// Available items flagged for the landing page, at most [`FEATURED_LIMIT`].
    pub async fn featured_items(&self) -> Result<Vec<MenuItem>, MenuError> {
        let mut items = self
            .inner
            .list(|item: &MenuItem| item.is_available && item.is_featured)
            .await
            .map_err(Self::map_error)?;
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items.truncate(FEATURED_LIMIT);
        Ok(items)
    }
}

#[async_trait]
impl ActorClient<MenuItem> for MenuClient {
    type Error = MenuError;

    fn inner(&self) -> &ResourceClient<MenuItem> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover_error(e, MenuError::NotFound)
    }
}

// =============================================================================
// Categories
// =============================================================================

/// Client for the categories table. Same permission rules as [`MenuClient`].
#[derive(Clone)]
pub struct CategoryClient {
    inner: ResourceClient<Category>,
}

impl CategoryClient {
    pub fn new(inner: ResourceClient<Category>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, session, params), fields(name = %params.name))]
    pub async fn create_category(
        &self,
        session: &Session,
        params: CategoryCreate,
    ) -> Result<String, MenuError> {
        require_admin(session)?;
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        info!(%id, "Category created");
        Ok(id)
    }

    #[instrument(skip(self, session, update))]
    pub async fn update_category(
        &self,
        session: &Session,
        id: String,
        update: CategoryUpdate,
    ) -> Result<Category, MenuError> {
        require_admin(session)?;
        self.inner.update(id, update).await.map_err(Self::map_error)
    }

    /// Deletes a category. Items pointing at it keep their (now dangling)
    /// `category_id` and are simply no longer listed under it.
    #[instrument(skip(self, session))]
    pub async fn delete_category(&self, session: &Session, id: String) -> Result<(), MenuError> {
        require_admin(session)?;
        ActorClient::delete(self, id).await
    }

    /// All categories by `display_order`, then name.
    pub async fn categories(&self) -> Result<Vec<Category>, MenuError> {
        let mut categories = self.inner.list(|_| true).await.map_err(Self::map_error)?;
        categories.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(categories)
    }
}

#[async_trait]
impl ActorClient<Category> for CategoryClient {
    type Error = MenuError;

    fn inner(&self) -> &ResourceClient<Category> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        recover_error(e, MenuError::NotFound)
    }
}
