//! Atelier prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, LineItem},
    catalog::{Catalog, CatalogError, Product, ProductKey},
    checkout::{AddressForm, Checkout, CheckoutError, CheckoutStep, PaymentForm},
    context::{Storefront, StorefrontInitError},
    gateways::{
        AuthError, Authenticator, CustomOrderRequest, Notifier, NotifyError, PaymentError,
        PaymentProcessor, StubAuthenticator, StubNotifier, StubPaymentProcessor, UserProfile,
    },
    orders::{
        Address, CANCELLATION_WINDOW, Order, OrderBook, OrderError, OrderId, OrderStatus,
        PaymentMethod,
    },
    search::{MAX_RECENT_SEARCHES, RecentSearches, SearchHistoryError},
    session::{Session, SessionError},
};
