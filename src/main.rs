//! # Bistro demo
//!
//! Walks one visitor through the storefront:
//! 1. An admin seeds a category and two dishes.
//! 2. The visitor fills a cart and checks out.
//! 3. The visitor books a table.
//! 4. The kitchen moves the order along.

use std::sync::Arc;

use bistro::checkout::DeliveryDetails;
use bistro::config::Config;
use bistro::lifecycle::{setup_tracing, Restaurant};
use bistro::model::{
    format_amount, CartItemCandidate, CategoryCreate, MenuItemCreate, OrderStatus, ReservationRequest,
    Session,
};
use bistro::payment::MemoryPaymentGateway;
use chrono::{Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    info!("Starting restaurant");
    let restaurant = Restaurant::start(Config::from_env())
        .with_payment_gateway(Arc::new(MemoryPaymentGateway::new()));

    let chef = Session::admin("user_0", "chef@bistro.example");
    let guest = Session::customer("user_1", "ada@example.com");

    // Seed the menu
    let span = tracing::info_span!("menu_seeding");
    let dishes = async {
        let mains = restaurant
            .category_client
            .create_category(
                &chef,
                CategoryCreate {
                    name: "Mains".to_string(),
                    description: None,
                    display_order: 1,
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        let mut risotto = MenuItemCreate::new("Mushroom Risotto", Decimal::new(1650, 2));
        risotto.category_id = Some(mains.clone());
        risotto.is_featured = true;
        restaurant
            .menu_client
            .create_item(&chef, risotto)
            .await
            .map_err(|e| e.to_string())?;

        let mut salad = MenuItemCreate::new("Caesar Salad", Decimal::new(900, 2));
        salad.category_id = Some(mains);
        restaurant
            .menu_client
            .create_item(&chef, salad)
            .await
            .map_err(|e| e.to_string())?;

        restaurant
            .menu_client
            .available_items(None)
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(span)
    .await?;
    info!(count = dishes.len(), "Menu seeded");

    // Fill the cart
    let mut cart = restaurant.cart();
    for dish in &dishes {
        cart.add_item(CartItemCandidate::from(dish));
    }
    if let Some(first) = dishes.first() {
        cart.add_item(CartItemCandidate::from(first));
    }
    let snapshot = cart.snapshot();
    info!(
        items = snapshot.total_items,
        total = %format_amount(snapshot.total_amount),
        "Cart ready"
    );

    // Check out
    let details = DeliveryDetails {
        customer_name: "Ada Lovelace".to_string(),
        customer_phone: "555-0100".to_string(),
        delivery_address: "12 Analytical Row".to_string(),
        notes: Some("Ring twice".to_string()),
    };
    let checkout = restaurant.checkout();
    let order_id = match checkout.submit(&mut cart, Some(&guest), details).await {
        Ok(receipt) => {
            info!(
                order_id = %receipt.order_id,
                total = %format_amount(receipt.total),
                redirect = receipt.redirect.path(),
                "Checkout complete"
            );
            Some(receipt.order_id)
        }
        Err(e) => {
            error!(error = %e, "Checkout failed");
            None
        }
    };
    drop(checkout);

    // Book a table
    let booking = ReservationRequest {
        customer_name: "Ada Lovelace".to_string(),
        customer_email: guest.email.clone(),
        customer_phone: "555-0100".to_string(),
        reservation_date: Utc::now().date_naive() + Duration::days(3),
        reservation_time: NaiveTime::from_hms_opt(19, 30, 0).ok_or("invalid time")?,
        number_of_guests: 4,
        special_requests: Some("Window seat".to_string()),
    };
    match restaurant.reservation_client.book(Some(&guest), booking).await {
        Ok(id) => info!(reservation_id = %id, "Table booked"),
        Err(e) => error!(error = %e, "Booking failed"),
    }

    // Kitchen workflow
    if let Some(order_id) = order_id {
        for status in [OrderStatus::Confirmed, OrderStatus::Preparing, OrderStatus::Ready] {
            if let Err(e) = restaurant
                .order_client
                .update_status(&chef, order_id.clone(), status)
                .await
            {
                error!(error = %e, "Status update failed");
            }
        }
        let lines = restaurant
            .order_client
            .items_for_order(&order_id)
            .await
            .map_err(|e| e.to_string())?;
        info!(%order_id, lines = lines.len(), "Order ready");
    }

    drop(cart);
    restaurant.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
