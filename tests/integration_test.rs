use std::sync::Arc;

use bistro::cart::{CartStorage, MemoryStorage};
use bistro::checkout::{CheckoutError, DeliveryDetails, SubmissionState};
use bistro::clients::ActorClient;
use bistro::config::Config;
use bistro::framework::ResourceChange;
use bistro::lifecycle::Restaurant;
use bistro::menu_actor::MenuError;
use bistro::model::{
    CartItemCandidate, CategoryCreate, CategoryUpdate, MenuItemCreate, MenuItemUpdate, OrderStatus, ReservationRequest,
    ReservationStatus, Route, Session,
};
use bistro::notify::{drain, Notification};
use bistro::order_actor::OrderError;
use bistro::payment::MemoryPaymentGateway;
use bistro::reservation_actor::ReservationError;
use chrono::{Duration, NaiveTime, Utc};
use rust_decimal::Decimal;

fn chef() -> Session {
    Session::admin("user_0", "chef@bistro.example")
}

fn guest() -> Session {
    Session::customer("user_1", "ada@example.com")
}

fn details() -> DeliveryDetails {
    DeliveryDetails {
        customer_name: "Ada Lovelace".into(),
        customer_phone: "555-0100".into(),
        delivery_address: "12 Analytical Row".into(),
        notes: None,
    }
}

fn booking(days_ahead: i64, guests: u32) -> ReservationRequest {
    ReservationRequest {
        customer_name: "Ada Lovelace".into(),
        customer_email: "ada@example.com".into(),
        customer_phone: "555-0100".into(),
        reservation_date: Utc::now().date_naive() + Duration::days(days_ahead),
        reservation_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
        number_of_guests: guests,
        special_requests: None,
    }
}

/// Full end-to-end flow with all real tables: menu, cart, checkout, history.
#[tokio::test]
async fn test_full_checkout_flow() {
    let storage = MemoryStorage::new();
    let restaurant = Restaurant::with_storage(Config::default(), Arc::new(storage.clone()));
    let mut events = restaurant.notifier().subscribe();

    let mains = restaurant
        .category_client
        .create_category(
            &chef(),
            CategoryCreate {
                name: "Mains".into(),
                description: None,
                display_order: 1,
            },
        )
        .await
        .expect("Failed to create category");

    let mut risotto = MenuItemCreate::new("Risotto", Decimal::new(1650, 2));
    risotto.category_id = Some(mains.clone());
    restaurant.menu_client.create_item(&chef(), risotto).await.unwrap();
    restaurant
        .menu_client
        .create_item(&chef(), MenuItemCreate::new("Lemonade", Decimal::new(350, 2)))
        .await
        .unwrap();

    let in_mains = restaurant.menu_client.available_items(Some(&mains)).await.unwrap();
    assert_eq!(in_mains.len(), 1);
    let everything = restaurant.menu_client.available_items(None).await.unwrap();
    assert_eq!(everything.len(), 2);

    // Lemonade ×2, Risotto ×1
    let mut cart = restaurant.cart();
    for item in &everything {
        cart.add_item(CartItemCandidate::from(item));
    }
    cart.add_item(CartItemCandidate::from(&everything[0]));
    assert_eq!(cart.total_items(), 3);
    assert_eq!(cart.total_amount(), Decimal::new(2350, 2));
    assert!(storage.contains("cart"));
    drain(&mut events);

    let checkout = restaurant.checkout();
    let receipt = checkout
        .submit(&mut cart, Some(&guest()), details())
        .await
        .expect("Checkout failed");

    assert_eq!(receipt.total, Decimal::new(2350, 2));
    assert_eq!(receipt.redirect, Route::Profile);
    assert_eq!(receipt.payment, None);
    assert_eq!(checkout.state(), SubmissionState::Succeeded);
    assert!(cart.is_empty());
    assert!(!storage.contains("cart"));
    assert_eq!(
        drain(&mut events),
        vec![
            Notification::CartCleared,
            Notification::OrderPlaced {
                order_id: receipt.order_id.clone()
            }
        ]
    );

    let history = restaurant.order_client.orders_for_user("user_1").await.unwrap();
    assert_eq!(history.len(), 1);
    let order = &history[0];
    assert_eq!(order.id, receipt.order_id);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.customer_email, "ada@example.com");
    assert_eq!(order.total_amount, Decimal::new(2350, 2));

    let lines = restaurant.order_client.items_for_order(&order.id).await.unwrap();
    let mut summary: Vec<(String, u32)> = lines.iter().map(|l| (l.item_name.clone(), l.quantity)).collect();
    summary.sort();
    assert_eq!(summary, vec![("Lemonade".to_string(), 2), ("Risotto".to_string(), 1)]);

    // A completed checkout refuses a second submission.
    cart.add_item(CartItemCandidate::from(&everything[0]));
    let again = checkout.submit(&mut cart, Some(&guest()), details()).await;
    assert_eq!(again.unwrap_err(), CheckoutError::AlreadyCompleted);
    assert_eq!(cart.total_items(), 1);

    drop(checkout);
    restaurant.shutdown().await.expect("Shutdown failed");
}

#[tokio::test]
async fn test_checkout_preconditions_have_no_side_effects() {
    let restaurant = Restaurant::new();
    let checkout = restaurant.checkout();
    let mut cart = restaurant.cart();

    let err = checkout.submit(&mut cart, Some(&guest()), details()).await.unwrap_err();
    assert_eq!(err, CheckoutError::EmptyCart);
    assert_eq!(err.redirect(), Some(Route::Cart));

    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(500, 2)));

    let err = checkout.submit(&mut cart, None, details()).await.unwrap_err();
    assert_eq!(err, CheckoutError::SignInRequired);
    assert_eq!(err.redirect(), Some(Route::SignIn));

    let mut blank = details();
    blank.delivery_address = String::new();
    let err = checkout.submit(&mut cart, Some(&guest()), blank).await.unwrap_err();
    assert_eq!(err, CheckoutError::InvalidDetails("delivery_address"));

    assert_eq!(checkout.state(), SubmissionState::Idle);
    assert_eq!(cart.total_items(), 1);
    assert!(restaurant.order_client.all_orders().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_payment_session_for_placed_order() {
    let gateway = MemoryPaymentGateway::new();
    let restaurant = Restaurant::new().with_payment_gateway(Arc::new(gateway.clone()));
    let mut cart = restaurant.cart();
    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(1005, 2)));

    let receipt = restaurant
        .checkout()
        .submit(&mut cart, Some(&guest()), details())
        .await
        .unwrap();

    assert!(receipt.payment.is_some());
    let requests = gateway.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].order_id, receipt.order_id);
    assert_eq!(requests[0].amount, 1005);
    assert_eq!(requests[0].customer_email, "ada@example.com");
}

#[tokio::test]
async fn test_rejected_payment_keeps_the_order() {
    let gateway = MemoryPaymentGateway::new();
    gateway.set_reject(true);
    let restaurant = Restaurant::new().with_payment_gateway(Arc::new(gateway));
    let mut cart = restaurant.cart();
    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(500, 2)));

    let receipt = restaurant
        .checkout()
        .submit(&mut cart, Some(&guest()), details())
        .await
        .unwrap();

    assert_eq!(receipt.payment, None);
    let order = restaurant.order_client.get(receipt.order_id).await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_menu_rules() {
    let restaurant = Restaurant::new();

    let err = restaurant
        .menu_client
        .create_item(&guest(), MenuItemCreate::new("Soup", Decimal::new(500, 2)))
        .await
        .unwrap_err();
    assert_eq!(err, MenuError::AdminRequired);

    let mut orphan = MenuItemCreate::new("Soup", Decimal::new(500, 2));
    orphan.category_id = Some("category_99".into());
    let err = restaurant.menu_client.create_item(&chef(), orphan).await.unwrap_err();
    assert_eq!(err, MenuError::UnknownCategory("category_99".into()));

    let err = restaurant
        .menu_client
        .create_item(&chef(), MenuItemCreate::new("Soup", Decimal::new(-1, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, MenuError::ValidationError(_)));

    let id = restaurant
        .menu_client
        .create_item(&chef(), MenuItemCreate::new("Soup", Decimal::new(500, 2)))
        .await
        .unwrap();
    let hidden = restaurant
        .menu_client
        .update_item(
            &chef(),
            id.clone(),
            MenuItemUpdate {
                is_available: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(!hidden.is_available);
    assert!(restaurant.menu_client.available_items(None).await.unwrap().is_empty());
    assert_eq!(restaurant.menu_client.all_items().await.unwrap().len(), 1);

    let mut special = MenuItemCreate::new("Tasting Menu", Decimal::new(6500, 2));
    special.is_featured = true;
    restaurant.menu_client.create_item(&chef(), special).await.unwrap();
    let featured = restaurant.menu_client.featured_items().await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].name, "Tasting Menu");

    restaurant.menu_client.delete_item(&chef(), id.clone()).await.unwrap();
    let err = restaurant.menu_client.delete_item(&chef(), id.clone()).await.unwrap_err();
    assert_eq!(err, MenuError::NotFound(id));
}

#[tokio::test]
async fn test_categories_listed_by_display_order() {
    let restaurant = Restaurant::new();
    for (name, order) in [("Desserts", 3), ("Starters", 1), ("Mains", 2)] {
        restaurant
            .category_client
            .create_category(
                &chef(),
                CategoryCreate {
                    name: name.into(),
                    description: None,
                    display_order: order,
                },
            )
            .await
            .unwrap();
    }
    let names: Vec<String> = restaurant
        .category_client
        .categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Starters", "Mains", "Desserts"]);

    let renamed = restaurant
        .category_client
        .update_category(
            &chef(),
            "category_1".into(),
            CategoryUpdate {
                display_order: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Desserts");

    let err = restaurant
        .category_client
        .delete_category(&guest(), "category_2".into())
        .await
        .unwrap_err();
    assert_eq!(err, MenuError::AdminRequired);
    restaurant
        .category_client
        .delete_category(&chef(), "category_2".into())
        .await
        .unwrap();

    let names: Vec<String> = restaurant
        .category_client
        .categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Desserts", "Mains"]);
}

#[tokio::test]
async fn test_order_status_workflow() {
    let restaurant = Restaurant::new();
    let mut cart = restaurant.cart();
    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(500, 2)));
    let receipt = restaurant
        .checkout()
        .submit(&mut cart, Some(&guest()), details())
        .await
        .unwrap();
    let mut changes = restaurant.order_client.watch().await.unwrap();

    let err = restaurant
        .order_client
        .update_status(&guest(), receipt.order_id.clone(), OrderStatus::Cancelled)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::AdminRequired);

    for status in [OrderStatus::Confirmed, OrderStatus::Ready, OrderStatus::Completed] {
        let now = restaurant
            .order_client
            .update_status(&chef(), receipt.order_id.clone(), status)
            .await
            .unwrap();
        assert_eq!(now, status);
    }
    assert_eq!(changes.recv().await.unwrap(), ResourceChange::Updated(receipt.order_id.clone()));

    let err = restaurant
        .order_client
        .update_status(&chef(), receipt.order_id.clone(), OrderStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        OrderError::InvalidTransition {
            from: OrderStatus::Completed,
            to: OrderStatus::Pending
        }
    );

    let err = restaurant
        .order_client
        .update_status(&chef(), "order_404".into(), OrderStatus::Ready)
        .await
        .unwrap_err();
    assert_eq!(err, OrderError::NotFound("order_404".into()));
}

#[tokio::test]
async fn test_reservations() {
    let restaurant = Restaurant::new();
    let mut events = restaurant.notifier().subscribe();

    let err = restaurant.reservation_client.book(None, booking(1, 2)).await.unwrap_err();
    assert_eq!(err, ReservationError::SignInRequired);

    let err = restaurant
        .reservation_client
        .book(Some(&guest()), booking(1, 21))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::ValidationError(_)));

    let err = restaurant
        .reservation_client
        .book(Some(&guest()), booking(-1, 2))
        .await
        .unwrap_err();
    assert!(matches!(err, ReservationError::ValidationError(_)));

    let soon = restaurant
        .reservation_client
        .book(Some(&guest()), booking(1, 2))
        .await
        .unwrap();
    let later = restaurant
        .reservation_client
        .book(Some(&guest()), booking(7, 20))
        .await
        .unwrap();

    assert_eq!(
        drain(&mut events),
        vec![
            Notification::SignInRequired,
            Notification::ReservationFailed,
            Notification::ReservationFailed,
            Notification::ReservationSubmitted {
                reservation_id: soon.clone()
            },
            Notification::ReservationSubmitted {
                reservation_id: later.clone()
            },
        ]
    );

    let mine = restaurant.reservation_client.reservations_for_user("user_1").await.unwrap();
    let ids: Vec<&str> = mine.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![later.as_str(), soon.as_str()]);
    assert!(mine.iter().all(|r| r.status == ReservationStatus::Pending));

    let status = restaurant
        .reservation_client
        .update_status(&chef(), soon.clone(), ReservationStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(status, ReservationStatus::Confirmed);

    let dashboard = restaurant.reservation_client.all_reservations().await.unwrap();
    let ids: Vec<&str> = dashboard.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec![soon.as_str(), later.as_str()]);
}

#[tokio::test]
async fn test_cart_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        data_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };

    let first = Restaurant::start(config.clone());
    let mut cart = first.cart();
    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(500, 2)));
    cart.add_item(CartItemCandidate::new("item_1", "Soup", Decimal::new(500, 2)));
    drop(cart);
    first.shutdown().await.unwrap();
    assert!(dir.path().join("cart.json").exists());

    let second = Restaurant::start(config);
    let mut cart = second.cart();
    assert_eq!(cart.total_items(), 2);
    assert_eq!(cart.total_amount(), Decimal::new(1000, 2));

    second
        .checkout()
        .submit(&mut cart, Some(&guest()), details())
        .await
        .unwrap();
    assert!(!dir.path().join("cart.json").exists());
}

#[tokio::test]
async fn test_corrupt_persisted_cart_loads_empty() {
    let storage = MemoryStorage::new();
    storage.insert_raw("cart", "{not json");
    let restaurant = Restaurant::with_storage(Config::default(), Arc::new(storage.clone()));

    let cart = restaurant.cart();
    assert!(cart.is_empty());
    assert_eq!(cart.total_amount(), Decimal::ZERO);
    assert!(storage.read("cart").unwrap().is_some());
}
