use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A section of the menu ("Starters", "Mains", ...).
///
/// # Table
/// Stored in the categories table; see [`crate::menu_actor`] for the
/// [`ActorEntity`](crate::framework::ActorEntity) implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Lower values are listed first.
    pub display_order: i32,
}

/// Payload for creating a new category.
#[derive(Debug, Clone)]
pub struct CategoryCreate {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i32,
}

/// Payload for updating an existing category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
}

/// A dish or drink that can be ordered.
///
/// # Table
/// Stored in the menu items table. Creation and updates check that the referenced
/// category exists (see [`crate::menu_actor`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
    /// Unavailable items stay in the table but are hidden from the storefront.
    pub is_available: bool,
    pub is_featured: bool,
}

/// Payload for creating a new menu item.
#[derive(Debug, Clone)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub is_featured: bool,
}

impl MenuItemCreate {
    /// An available, non-featured item with no category or image.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            description: None,
            price,
            category_id: None,
            image_url: None,
            is_available: true,
            is_featured: false,
        }
    }
}

/// Payload for updating an existing menu item.
///
/// `category_id: Some(None)` detaches the item from its category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Option<String>>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub is_featured: Option<bool>,
}
