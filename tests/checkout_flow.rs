//! Integration test for the full storefront flow.
//!
//! Drives a whole session the way the UI does: sign in, search, fill the
//! cart, walk the two-step checkout against the simulated gateways, and read
//! the order back from the history.

use std::{sync::Arc, time::Duration};

use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use atelier::{
    catalog::Catalog,
    checkout::{AddressForm, Checkout, CheckoutStep, PaymentForm},
    context::Storefront,
    gateways::{StubAuthenticator, StubNotifier, StubPaymentProcessor},
    orders::{OrderStatus, PaymentMethod},
    search::RecentSearches,
};

fn storefront(dir: &std::path::Path) -> TestResult<Storefront<'static>> {
    Ok(Storefront::with_gateways(
        Catalog::load("fixtures/catalog.yml")?,
        RecentSearches::load(dir.join("recent.json"))?,
        Arc::new(StubAuthenticator::with_latency(Duration::ZERO)),
        Arc::new(StubPaymentProcessor::with_latency(Duration::ZERO)),
        Arc::new(StubNotifier::with_latency(Duration::ZERO)),
    )?)
}

fn address_form() -> AddressForm {
    AddressForm {
        street: "12 Kiln Lane".to_string(),
        city: "Asheville".to_string(),
        state: "NC".to_string(),
        zip_code: "28801".to_string(),
        country: String::new(),
        phone: "555-0134".to_string(),
    }
}

fn card_form() -> PaymentForm {
    PaymentForm {
        method: PaymentMethod::CreditCard,
        card_name: "Jane Doe".to_string(),
        card_number: "4242 4242 4242 4242".to_string(),
        expiry_date: "12/27".to_string(),
        cvv: "123".to_string(),
    }
}

#[tokio::test]
async fn a_full_session_from_sign_in_to_order_history() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut store = storefront(dir.path())?;

    // Sign in.
    store.session.login("jane@example.com", "hunter42").await?;

    assert!(store.session.is_authenticated(), "should be signed in");

    // Search and put two vases and a mug in the cart.
    let hits = store.search_products("pottery")?;

    assert_eq!(hits.len(), 2, "two pottery products in the catalogue");
    assert_eq!(store.searches.entries(), ["pottery"]);

    let vase = store.catalog.by_sku("ceramic-vase")?;
    let mug = store.catalog.by_sku("hand-painted-mug")?;

    store.cart.add(store.catalog.line_item(vase)?)?;
    store.cart.add(store.catalog.line_item(vase)?)?;
    store.cart.add(store.catalog.line_item(mug)?)?;

    let expected_total = store.cart.total()?;

    // Two-step checkout.
    let mut checkout = Checkout::new();

    checkout.submit_address(&address_form())?;

    let id = checkout
        .submit_payment(
            &card_form(),
            &mut store.cart,
            &mut store.orders,
            store.payments.as_ref(),
        )
        .await?;

    assert_eq!(checkout.step(), CheckoutStep::Complete(id.clone()));
    assert!(store.cart.is_empty(), "cart is cleared after checkout");

    // The order history has the frozen snapshot.
    let order = store.orders.get(&id).ok_or("order should exist")?;

    assert_eq!(order.total(), &expected_total);
    assert_eq!(order.total(), &Money::from_minor(286_00, USD));
    assert_eq!(order.status(), OrderStatus::Pending);
    assert_eq!(order.payment_method(), PaymentMethod::CreditCard);
    assert!(order.cancellable(), "a fresh order is cancellable");

    Ok(())
}

#[tokio::test]
async fn a_second_checkout_needs_a_fresh_wizard() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut store = storefront(dir.path())?;

    let vase = store.catalog.by_sku("ceramic-vase")?;

    store.cart.add(store.catalog.line_item(vase)?)?;

    let mut checkout = Checkout::new();

    checkout.submit_address(&address_form())?;
    checkout
        .submit_payment(
            &card_form(),
            &mut store.cart,
            &mut store.orders,
            store.payments.as_ref(),
        )
        .await?;

    // Refill the cart and go again with a new wizard.
    store.cart.add(store.catalog.line_item(vase)?)?;

    let mut checkout = Checkout::new();

    checkout.submit_address(&address_form())?;

    let second = checkout
        .submit_payment(
            &PaymentForm {
                method: PaymentMethod::Paypal,
                ..PaymentForm::default()
            },
            &mut store.cart,
            &mut store.orders,
            store.payments.as_ref(),
        )
        .await?;

    assert_eq!(store.orders.len(), 2);
    assert_eq!(
        store.orders.orders().first().map(|order| order.id()),
        Some(&second),
        "newest order first"
    );

    Ok(())
}

#[tokio::test]
async fn cancelling_from_the_history_respects_the_rules() -> TestResult {
    let dir = tempfile::tempdir()?;
    let mut store = storefront(dir.path())?;

    let vase = store.catalog.by_sku("ceramic-vase")?;

    store.cart.add(store.catalog.line_item(vase)?)?;

    let mut checkout = Checkout::new();

    checkout.submit_address(&address_form())?;

    let id = checkout
        .submit_payment(
            &card_form(),
            &mut store.cart,
            &mut store.orders,
            store.payments.as_ref(),
        )
        .await?;

    assert!(store.orders.cancel(&id), "cancel reports success");

    let order = store.orders.get(&id).ok_or("order should exist")?;

    assert_eq!(order.status(), OrderStatus::Cancelled);
    assert!(!order.cancellable(), "a cancelled order stays cancelled");

    Ok(())
}
