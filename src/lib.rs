//! Atelier
//!
//! Atelier is the storefront core for an artisan goods shop: product catalogue,
//! cart, checkout and the order lifecycle, with the external services (payments,
//! authentication, notifications) behind pluggable gateway boundaries.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod context;
pub mod gateways;
pub mod orders;
pub mod prelude;
pub mod search;
pub mod session;
