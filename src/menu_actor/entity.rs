//! [`ActorEntity`] implementations for [`Category`] and [`MenuItem`].
//!
//! Menu items are wired to the categories table through their `Context`, so a
//! menu item can only ever point at a category that exists.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::MenuError;
use crate::framework::{ActorEntity, ResourceClient};
use crate::model::{Category, CategoryCreate, CategoryUpdate, MenuItem, MenuItemCreate, MenuItemUpdate};

fn require_name(name: &str) -> Result<(), MenuError> {
    if name.trim().is_empty() {
        return Err(MenuError::ValidationError("name must not be empty".to_string()));
    }
    Ok(())
}

fn require_price(price: Decimal) -> Result<(), MenuError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(MenuError::ValidationError(format!("price must not be negative, got {price}")));
    }
    Ok(())
}

#[async_trait]
impl ActorEntity for Category {
    type Id = String;
    type Create = CategoryCreate;
    type Update = CategoryUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ();
    type Error = MenuError;

    fn from_create_params(id: String, params: CategoryCreate) -> Result<Self, MenuError> {
        require_name(&params.name)?;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            display_order: params.display_order,
        })
    }

    async fn on_update(&mut self, update: CategoryUpdate, _ctx: &()) -> Result<(), MenuError> {
        if let Some(name) = update.name {
            require_name(&name)?;
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(display_order) = update.display_order {
            self.display_order = display_order;
        }
        Ok(())
    }

    async fn handle_action(&mut self, _action: (), _ctx: &()) -> Result<(), MenuError> {
        Ok(())
    }
}

/// Checks that `category_id` (if any) names an existing category.
async fn require_category(
    categories: &ResourceClient<Category>,
    category_id: Option<&String>,
) -> Result<(), MenuError> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    match categories.get(category_id.clone()).await {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(MenuError::UnknownCategory(category_id.clone())),
        Err(e) => Err(MenuError::ActorCommunicationError(e.to_string())),
    }
}

#[async_trait]
impl ActorEntity for MenuItem {
    type Id = String;
    type Create = MenuItemCreate;
    type Update = MenuItemUpdate;
    type Action = ();
    type ActionResult = ();
    type Context = ResourceClient<Category>;
    type Error = MenuError;

    fn from_create_params(id: String, params: MenuItemCreate) -> Result<Self, MenuError> {
        require_name(&params.name)?;
        require_price(params.price)?;
        Ok(Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            category_id: params.category_id,
            image_url: params.image_url,
            is_available: params.is_available,
            is_featured: params.is_featured,
        })
    }

    async fn on_create(&mut self, categories: &ResourceClient<Category>) -> Result<(), MenuError> {
        require_category(categories, self.category_id.as_ref()).await
    }

    /// Applies the set fields of `update`.
    ///
    /// The row is a copy; any error leaves the stored item unchanged.
    async fn on_update(
        &mut self,
        update: MenuItemUpdate,
        categories: &ResourceClient<Category>,
    ) -> Result<(), MenuError> {
        if let Some(name) = update.name {
            require_name(&name)?;
            self.name = name;
        }
        if let Some(price) = update.price {
            require_price(price)?;
            self.price = price;
        }
        if let Some(category_id) = update.category_id {
            require_category(categories, category_id.as_ref()).await?;
            self.category_id = category_id;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(image_url) = update.image_url {
            self.image_url = Some(image_url);
        }
        if let Some(is_available) = update.is_available {
            self.is_available = is_available;
        }
        if let Some(is_featured) = update.is_featured {
            self.is_featured = is_featured;
        }
        Ok(())
    }

    async fn handle_action(
        &mut self,
        _action: (),
        _ctx: &ResourceClient<Category>,
    ) -> Result<(), MenuError> {
        Ok(())
    }
}
