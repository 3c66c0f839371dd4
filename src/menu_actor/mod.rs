//! Menu tables: categories and menu items.

pub mod entity;
pub mod error;

pub use error::*;

use crate::clients::{CategoryClient, MenuClient};
use crate::framework::ResourceActor;
use crate::model::{Category, MenuItem};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Creates the categories table and its client.
pub fn new_categories(buffer_size: usize) -> (ResourceActor<Category>, CategoryClient) {
    let category_id_counter = Arc::new(AtomicU64::new(1));
    let next_category_id = move || {
        let id = category_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("category_{}", id)
    };

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_category_id);
    (actor, CategoryClient::new(generic_client))
}

/// Creates the menu items table and its client.
///
/// The actor must be run with the categories table's client as its context.
pub fn new_items(buffer_size: usize) -> (ResourceActor<MenuItem>, MenuClient) {
    let item_id_counter = Arc::new(AtomicU64::new(1));
    let next_item_id = move || {
        let id = item_id_counter.fetch_add(1, Ordering::SeqCst);
        format!("item_{}", id)
    };

    let (actor, generic_client) = ResourceActor::new(buffer_size, next_item_id);
    (actor, MenuClient::new(generic_client))
}
