//! Storefront Context
//!
//! One explicit context per active session: the catalogue, one cart, one
//! order book, one authentication session and the gateway handles, all
//! constructed at top level and passed by reference to whatever needs them.

use std::{
    fmt::{self, Debug, Formatter},
    path::Path,
    sync::Arc,
};

use thiserror::Error;

use crate::{
    cart::Cart,
    catalog::{Catalog, CatalogError, ProductKey},
    gateways::{
        Authenticator, CustomOrderRequest, Notifier, NotifyError, PaymentProcessor,
        StubAuthenticator, StubNotifier, StubPaymentProcessor,
    },
    orders::OrderBook,
    search::{RecentSearches, SearchHistoryError},
    session::Session,
};

/// Errors while assembling the storefront.
#[derive(Debug, Error)]
pub enum StorefrontInitError {
    /// The catalogue could not be loaded or is unusable.
    #[error("failed to load product catalogue")]
    Catalog(#[from] CatalogError),

    /// The search history could not be loaded.
    #[error("failed to load search history")]
    SearchHistory(#[from] SearchHistoryError),
}

/// Everything one shopping session needs, wired together once.
pub struct Storefront<'a> {
    /// Product catalogue
    pub catalog: Catalog<'a>,

    /// The session's cart
    pub cart: Cart<'a>,

    /// The session's orders
    pub orders: OrderBook<'a>,

    /// Authentication state
    pub session: Session,

    /// Recent search terms
    pub searches: RecentSearches,

    /// Payment processor handle
    pub payments: Arc<dyn PaymentProcessor>,

    /// Notification service handle
    pub notifier: Arc<dyn Notifier>,
}

impl Debug for Storefront<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("catalog", &self.catalog.len())
            .field("cart", &self.cart.len())
            .field("orders", &self.orders.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl Storefront<'static> {
    /// Open a storefront over the given catalogue file and search-history
    /// key, with the simulated gateways.
    ///
    /// # Errors
    ///
    /// Returns a `StorefrontInitError` when the catalogue or search history
    /// cannot be loaded.
    pub fn open(
        catalog_path: impl AsRef<Path>,
        searches_path: impl AsRef<Path>,
    ) -> Result<Self, StorefrontInitError> {
        Self::with_gateways(
            Catalog::load(catalog_path)?,
            RecentSearches::load(searches_path.as_ref())?,
            Arc::new(StubAuthenticator::new()),
            Arc::new(StubPaymentProcessor::new()),
            Arc::new(StubNotifier::new()),
        )
    }
}

impl<'a> Storefront<'a> {
    /// Assemble a storefront from its parts, injecting the gateways.
    ///
    /// # Errors
    ///
    /// Returns a `StorefrontInitError` when the catalogue is empty, since
    /// the cart and order book need its currency.
    pub fn with_gateways(
        catalog: Catalog<'a>,
        searches: RecentSearches,
        authenticator: Arc<dyn Authenticator>,
        payments: Arc<dyn PaymentProcessor>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StorefrontInitError> {
        let currency = catalog.currency()?;

        Ok(Self {
            catalog,
            cart: Cart::new(currency),
            orders: OrderBook::new(currency),
            session: Session::new(authenticator),
            searches,
            payments,
            notifier,
        })
    }

    /// Search the catalogue, recording the term in the history.
    ///
    /// # Errors
    ///
    /// Returns a `SearchHistoryError` when the history cannot be written;
    /// the search itself cannot fail.
    pub fn search_products(&mut self, query: &str) -> Result<Vec<ProductKey>, SearchHistoryError> {
        self.searches.record(query)?;

        Ok(self.catalog.search(query))
    }

    /// Forward a custom-order enquiry to the workshop.
    ///
    /// # Errors
    ///
    /// Returns a `NotifyError` when the notification service rejects it.
    pub async fn submit_custom_order(
        &self,
        request: &CustomOrderRequest,
    ) -> Result<(), NotifyError> {
        self.notifier.notify(request).await
    }
}
