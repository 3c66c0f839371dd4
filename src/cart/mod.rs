//! # Cart Store
//!
//! The active cart of one visitor: an ordered list of [`LineItem`]s keyed by
//! menu item id, derived totals, best-effort persistence and change
//! notifications.
//!
//! ## Ownership
//!
//! A [`CartStore`] is a plain owned value. The runtime builds one per visitor
//! session ([`Restaurant::cart`](crate::lifecycle::Restaurant::cart)) and passes
//! it by `&mut` to whatever needs to change it, checkout included. Surfaces that
//! only display the cart subscribe to the [`Notifier`] instead of holding a
//! reference.
//!
//! ## Invariants
//!
//! - ids are unique; insertion order is preserved for display
//! - every stored quantity is at least 1
//! - totals are recomputed on every read

pub mod error;
pub mod storage;

pub use error::*;
pub use storage::*;

use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::model::{CartItemCandidate, CartSnapshot, LineItem};
use crate::notify::{Notification, Notifier};

#[derive(Debug)]
pub struct CartStore {
    items: Vec<LineItem>,
    persistence: CartPersistence,
    notifier: Notifier,
}

impl CartStore {
    /// Rehydrates the cart from storage. Missing or corrupt data gives an empty cart.
    pub fn load(persistence: CartPersistence, notifier: Notifier) -> Self {
        let items = persistence.load();
        info!(key = persistence.key(), count = items.len(), "Cart loaded");
        Self {
            items,
            persistence,
            notifier,
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Adds one unit of `candidate`. A repeated id bumps the existing quantity
    /// instead of creating a second line.
    pub fn add_item(&mut self, candidate: CartItemCandidate) {
        let notification = match self.items.iter_mut().find(|item| item.id == candidate.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(1);
                debug!(id = %existing.id, quantity = existing.quantity, "Cart quantity bumped");
                Notification::QuantityUpdated {
                    id: existing.id.clone(),
                    quantity: existing.quantity,
                }
            }
            None => {
                debug!(id = %candidate.id, "Cart item added");
                let notification = Notification::ItemAdded {
                    id: candidate.id.clone(),
                    name: candidate.name.clone(),
                };
                self.items.push(candidate.into_line_item());
                notification
            }
        };
        self.persist();
        self.notifier.notify(notification);
    }

    /// Removes the line with `id`. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            debug!(id, "Remove ignored, not in cart");
            return;
        }
        debug!(id, "Cart item removed");
        self.persist();
        self.notifier.notify(Notification::ItemRemoved { id: id.to_string() });
    }

    /// Sets the quantity of an existing line. Zero or negative removes the line;
    /// an unknown id is ignored (updates never insert). A quantity that doesn't
    /// fit in a `u32` is refused and the line keeps its current quantity.
    pub fn update_quantity(&mut self, id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let Ok(quantity) = u32::try_from(quantity) else {
            warn!(id, quantity, "Update refused, quantity out of range");
            return;
        };
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            debug!(id, "Update ignored, not in cart");
            return;
        };
        item.quantity = quantity;
        debug!(id, quantity, "Cart quantity set");
        self.persist();
        self.notifier.notify(Notification::QuantityUpdated {
            id: id.to_string(),
            quantity,
        });
    }

    /// Empties the cart and erases the persisted key.
    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.persistence.remove();
        info!(key = self.persistence.key(), "Cart cleared");
        self.notifier.notify(Notification::CartCleared);
    }

    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of the line subtotals. Saturates at `Decimal::MAX`.
    pub fn total_amount(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            total_items: self.total_items(),
            total_amount: self.total_amount(),
        }
    }

    fn persist(&self) {
        self.persistence.save(&self.items);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::drain;
    use std::sync::Arc;

    fn candidate(id: &str, cents: i64) -> CartItemCandidate {
        CartItemCandidate::new(id, format!("Dish {id}"), Decimal::new(cents, 2))
    }

    fn store() -> (MemoryStorage, CartStore) {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(Arc::new(storage.clone()), DEFAULT_CART_KEY);
        (storage, CartStore::load(persistence, Notifier::default()))
    }

    fn assert_totals_match(cart: &CartStore) {
        let quantities: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
        let amount: Decimal = cart
            .items()
            .iter()
            .map(|i| i.unit_price * Decimal::from(i.quantity))
            .sum();
        assert_eq!(cart.total_items(), quantities);
        assert_eq!(cart.total_amount(), amount);
        assert!(cart.items().iter().all(|i| i.quantity >= 1));
    }

    #[test]
    fn test_duplicate_add_increments() {
        let (_, mut cart) = store();
        cart.add_item(candidate("a", 1000));
        cart.add_item(candidate("a", 1000));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total_amount(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_add_keeps_snapshot_price() {
        let (_, mut cart) = store();
        cart.add_item(candidate("a", 1000));
        // Price changed on the menu since; the cart keeps the first snapshot.
        cart.add_item(candidate("a", 1200));
        assert_eq!(cart.items()[0].unit_price, Decimal::new(1000, 2));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let (_, mut cart) = store();
        cart.add_item(candidate("c", 100));
        cart.add_item(candidate("a", 100));
        cart.add_item(candidate("b", 100));
        cart.add_item(candidate("a", 100));
        let ids: Vec<&str> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_non_positive_quantity_removes() {
        let (_, mut cart) = store();
        cart.add_item(candidate("a", 100));
        cart.add_item(candidate("b", 100));

        cart.update_quantity("a", 0);
        cart.update_quantity("b", -5);

        assert!(cart.is_empty());
        assert_totals_match(&cart);
    }

    #[test]
    fn test_update_replaces_quantity() {
        let (_, mut cart) = store();
        cart.add_item(candidate("a", 250));
        cart.add_item(candidate("a", 250));
        cart.update_quantity("a", 5);
        assert_eq!(cart.get("a").map(|i| i.quantity), Some(5));
        assert_eq!(cart.total_amount(), Decimal::new(1250, 2));
    }

    #[test]
    fn test_out_of_range_quantity_is_refused() {
        let (_, mut cart) = store();
        cart.add_item(candidate("a", 250));
        cart.update_quantity("a", 3);
        let mut events = cart.subscribe();

        cart.update_quantity("a", i64::MAX);

        assert_eq!(cart.get("a").map(|i| i.quantity), Some(3));
        assert!(drain(&mut events).is_empty());
    }

    #[test]
    fn test_huge_totals_saturate() {
        let (_, mut cart) = store();
        cart.add_item(CartItemCandidate::new("a", "Gold leaf", Decimal::MAX));
        cart.add_item(CartItemCandidate::new("b", "Saffron", Decimal::MAX));
        cart.update_quantity("a", i64::from(u32::MAX));

        assert_eq!(cart.total_amount(), Decimal::MAX);
        assert_eq!(cart.total_items(), u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_update_never_inserts() {
        let (storage, mut cart) = store();
        cart.update_quantity("missing", 3);
        assert!(cart.is_empty());
        assert!(!storage.contains(DEFAULT_CART_KEY));
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (_, mut cart) = store();
        let mut events = cart.subscribe();
        cart.remove_item("missing");
        assert!(cart.is_empty());
        assert!(drain(&mut events).is_empty());
    }

    #[test]
    fn test_clear_erases_persisted_key() {
        let (storage, mut cart) = store();
        cart.add_item(candidate("a", 1000));
        assert!(storage.contains(DEFAULT_CART_KEY));

        cart.clear_cart();

        assert_eq!(cart.total_items(), 0);
        assert_eq!(cart.total_amount(), Decimal::ZERO);
        assert!(!storage.contains(DEFAULT_CART_KEY));
    }

    #[test]
    fn test_mutations_survive_reload() {
        let storage = MemoryStorage::new();
        let persistence = CartPersistence::new(Arc::new(storage.clone()), DEFAULT_CART_KEY);

        let mut cart = CartStore::load(persistence.clone(), Notifier::default());
        cart.add_item(candidate("a", 1000));
        cart.add_item(candidate("b", 350));
        cart.update_quantity("b", 4);
        drop(cart);

        let reloaded = CartStore::load(persistence, Notifier::default());
        assert_eq!(reloaded.items().len(), 2);
        assert_eq!(reloaded.total_items(), 5);
        assert_eq!(reloaded.total_amount(), Decimal::new(2400, 2));
    }

    #[test]
    fn test_storage_failure_keeps_memory_state() {
        let (storage, mut cart) = store();
        storage.set_fail_writes(true);

        cart.add_item(candidate("a", 1000));
        cart.add_item(candidate("a", 1000));

        assert_eq!(cart.total_items(), 2);
        assert!(!storage.contains(DEFAULT_CART_KEY));
    }

    #[test]
    fn test_notifications() {
        let (_, mut cart) = store();
        let mut events = cart.subscribe();

        cart.add_item(candidate("a", 100));
        cart.add_item(candidate("a", 100));
        cart.update_quantity("a", 0);
        cart.clear_cart();

        assert_eq!(
            drain(&mut events),
            vec![
                Notification::ItemAdded {
                    id: "a".into(),
                    name: "Dish a".into()
                },
                Notification::QuantityUpdated {
                    id: "a".into(),
                    quantity: 2
                },
                Notification::ItemRemoved { id: "a".into() },
                Notification::CartCleared,
            ]
        );
    }

    #[test]
    fn test_totals_hold_across_mixed_operations() {
        let (_, mut cart) = store();
        let ids = ["a", "b", "c", "d"];
        // Deterministic pseudo-random walk over the operations.
        let mut seed: u64 = 7;
        for step in 0..200 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let id = ids[(seed >> 33) as usize % ids.len()];
            match (seed >> 40) % 4 {
                0 | 1 => cart.add_item(candidate(id, 100 + (step % 7) * 25)),
                2 => cart.remove_item(id),
                _ => cart.update_quantity(id, ((seed >> 45) % 7) as i64 - 2),
            }
            assert_totals_match(&cart);
        }
    }
}
