use std::sync::Arc;

use tracing::{error, info};

use crate::cart::{CartPersistence, CartStorage, CartStore, FileStorage, MemoryStorage};
use crate::checkout::Checkout;
use crate::clients::{ActorClient, CategoryClient, MenuClient, OrderClient, ReservationClient};
use crate::config::Config;
use crate::notify::Notifier;
use crate::payment::PaymentGateway;

/// The running restaurant back end.
///
/// `Restaurant` is responsible for:
/// - **Lifecycle Management**: starting and stopping every table
/// - **Dependency Wiring**: menu items see the categories table, order lines
///   see the orders table
/// - **Per-visitor state**: building carts and checkouts that share the
///   process-wide [`Notifier`]
///
/// # Example
///
/// ```ignore
/// let restaurant = Restaurant::start(Config::from_env());
///
/// let mut cart = restaurant.cart();
/// cart.add_item(CartItemCandidate::from(&menu_item));
/// let receipt = restaurant.checkout().submit(&mut cart, Some(&session), details).await?;
///
/// restaurant.shutdown().await?;
/// ```
pub struct Restaurant {
    pub menu_client: MenuClient,
    pub category_client: CategoryClient,
    pub order_client: OrderClient,
    pub reservation_client: ReservationClient,

    notifier: Notifier,
    storage: Arc<dyn CartStorage>,
    cart_key: String,
    payments: Option<Arc<dyn PaymentGateway>>,

    /// Task handles for all running tables (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Restaurant {
    /// Starts with default settings and an in-memory cart.
    pub fn new() -> Self {
        Self::start(Config::default())
    }

    /// Starts every table. Must be called from within a Tokio runtime.
    pub fn start(config: Config) -> Self {
        let storage: Arc<dyn CartStorage> = match &config.data_dir {
            Some(dir) => Arc::new(FileStorage::new(dir.clone())),
            None => Arc::new(MemoryStorage::new()),
        };
        Self::with_storage(config, storage)
    }

    /// Starts every table, persisting carts through `storage`.
    pub fn with_storage(config: Config, storage: Arc<dyn CartStorage>) -> Self {
        let buffer = config.channel_buffer;
        let notifier = Notifier::default();

        // 1. Create tables
        let (category_actor, category_client) = crate::menu_actor::new_categories(buffer);
        let (item_actor, menu_client) = crate::menu_actor::new_items(buffer);
        let (order_actor, order_item_actor, order_client) =
            crate::order_actor::new(buffer, notifier.clone());
        let (reservation_actor, reservation_client) =
            crate::reservation_actor::new(buffer, notifier.clone());

        // 2. Start tables with injected context
        let handles = vec![
            tokio::spawn(category_actor.run(())),
            tokio::spawn(item_actor.run(category_client.inner().clone())),
            tokio::spawn(order_actor.run(())),
            tokio::spawn(order_item_actor.run(order_client.inner().clone())),
            tokio::spawn(reservation_actor.run(())),
        ];
        info!(buffer, cart_key = %config.cart_key, "Restaurant started");

        Self {
            menu_client,
            category_client,
            order_client,
            reservation_client,
            notifier,
            storage,
            cart_key: config.cart_key,
            payments: None,
            handles,
        }
    }

    /// Every checkout handed out afterwards opens a payment session for its order.
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(gateway);
        self
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Loads the visitor's cart from storage.
    pub fn cart(&self) -> CartStore {
        let persistence = CartPersistence::new(self.storage.clone(), self.cart_key.clone());
        CartStore::load(persistence, self.notifier.clone())
    }

    /// A fresh checkout flow (state `Idle`).
    pub fn checkout(&self) -> Checkout {
        let checkout = Checkout::new(self.order_client.clone(), self.notifier.clone());
        match &self.payments {
            Some(gateway) => checkout.with_payment_gateway(gateway.clone()),
            None => checkout,
        }
    }

    /// Gracefully shuts down every table.
    ///
    /// Dropping the clients closes the table mailboxes; each table then drains
    /// and exits. Clones handed out earlier (checkouts included) must be dropped
    /// first, or the matching table keeps running.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all tables shut down cleanly
    /// - `Err(String)` if any table task panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down restaurant...");

        drop(self.menu_client);
        drop(self.category_client);
        drop(self.order_client);
        drop(self.reservation_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Table task failed: {:?}", e);
                return Err(format!("Table task failed: {:?}", e));
            }
        }

        info!("Restaurant shutdown complete.");
        Ok(())
    }
}

impl Default for Restaurant {
    fn default() -> Self {
        Self::new()
    }
}
