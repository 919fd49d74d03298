//! Orders
//!
//! An order is an immutable-at-creation snapshot of a completed checkout with
//! a mutable status field. Its total is computed once when the order is placed
//! and never recomputed, so later catalogue price changes cannot retroactively
//! alter order history.

use std::fmt::{self, Display, Formatter};

use jiff::{SignedDuration, Timestamp};
use rand::{Rng, distributions::Alphanumeric, thread_rng};
use rusty_money::{
    Money, MoneyError,
    iso::Currency,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::cart::LineItem;

/// The period after placement during which an order may still be cancelled,
/// subject to status constraints.
pub const CANCELLATION_WINDOW: SignedDuration = SignedDuration::from_hours(14 * 24);

/// Order lifecycle status.
///
/// `pending` and the shopper-triggered `cancelled` are driven here; the
/// fulfilment states are driven externally via [`OrderBook::set_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed, awaiting fulfilment
    Pending,

    /// Picked up by fulfilment
    Processing,

    /// Handed to the carrier
    Shipped,

    /// Arrived with the shopper
    Delivered,

    /// Cancelled by the shopper
    Cancelled,
}

impl OrderStatus {
    /// Whether any further transition is possible out of this status.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether fulfilment may move an order from this status to `next`.
    #[must_use]
    pub fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing | Self::Cancelled)
                | (Self::Processing, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    /// Lowercase display form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-unique order identifier, time-based with a random suffix.
///
/// Uniqueness is sufficient for display purposes, not cryptographic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    fn generate(at: Timestamp) -> Self {
        let suffix: String = thread_rng()
            .sample_iter(&Alphanumeric)
            .take(9)
            .map(|byte| char::from(byte).to_ascii_uppercase())
            .collect();

        Self(format!("ORD-{}-{suffix}", at.as_millisecond()))
    }

    /// The identifier as text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shipping address, copied into the order at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street and number
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Country code
    pub country: String,
}

/// How the shopper chose to pay. Card details never reach the order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    /// Pay by credit card
    CreditCard,

    /// Pay via PayPal
    Paypal,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreditCard => f.write_str("credit-card"),
            Self::Paypal => f.write_str("paypal"),
        }
    }
}

/// Errors related to order placement or status transitions.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No order exists with the given id.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The requested status change is not allowed by the lifecycle.
    #[error("order cannot move from {from} to {to}")]
    InvalidTransition {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// A placed order.
#[derive(Debug, Clone)]
pub struct Order<'a> {
    id: OrderId,
    items: Vec<LineItem<'a>>,
    total: Money<'a, Currency>,
    status: OrderStatus,
    created_at: Timestamp,
    address: Address,
    payment_method: PaymentMethod,
}

impl<'a> Order<'a> {
    /// Order identifier.
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// The line items as they were at checkout time.
    pub fn items(&self) -> &[LineItem<'a>] {
        &self.items
    }

    /// The total as computed at checkout time.
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Current lifecycle status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// When the order was placed.
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Shipping address.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Payment method used.
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Whether the order could be cancelled at the given point in time:
    /// within the cancellation window and not yet shipped, delivered or
    /// already cancelled.
    #[must_use]
    pub fn cancellable_at(&self, now: Timestamp) -> bool {
        now.duration_since(self.created_at) <= CANCELLATION_WINDOW
            && !matches!(
                self.status,
                OrderStatus::Shipped | OrderStatus::Delivered | OrderStatus::Cancelled
            )
    }

    /// Whether the order can be cancelled right now.
    #[must_use]
    pub fn cancellable(&self) -> bool {
        self.cancellable_at(Timestamp::now())
    }
}

/// The list of orders for a session, newest first.
#[derive(Debug)]
pub struct OrderBook<'a> {
    orders: Vec<Order<'a>>,
    currency: &'a Currency,
}

impl<'a> OrderBook<'a> {
    /// Create an empty order book.
    #[must_use]
    pub fn new(currency: &'a Currency) -> Self {
        Self {
            orders: Vec::new(),
            currency,
        }
    }

    /// Place an order from a snapshot of cart lines.
    ///
    /// No validation of the items or address happens at this layer; that is
    /// the checkout form's job.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` if the total cannot be computed, e.g. on a
    /// currency mismatch between lines.
    pub fn place(
        &mut self,
        items: Vec<LineItem<'a>>,
        address: Address,
        payment_method: PaymentMethod,
    ) -> Result<OrderId, OrderError> {
        self.place_at(items, address, payment_method, Timestamp::now())
    }

    /// Place an order as of an explicit point in time.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` if the total cannot be computed.
    pub fn place_at(
        &mut self,
        items: Vec<LineItem<'a>>,
        address: Address,
        payment_method: PaymentMethod,
        now: Timestamp,
    ) -> Result<OrderId, OrderError> {
        let total = items.iter().try_fold(
            Money::from_minor(0, self.currency),
            |acc, line| acc.add(line.line_total()),
        )?;

        let id = OrderId::generate(now);

        let order = Order {
            id: id.clone(),
            items,
            total,
            status: OrderStatus::Pending,
            created_at: now,
            address,
            payment_method,
        };

        // Newest first.
        self.orders.insert(0, order);

        info!(order_id = %id, total = %total, "placed order");

        Ok(id)
    }

    /// Cancel an order.
    ///
    /// The cancellation applies only when the order exists, is inside the
    /// cancellation window and has not shipped, been delivered or already
    /// been cancelled. The return value is `true` either way; callers that
    /// need to know whether anything changed must read the order status back.
    pub fn cancel(&mut self, id: &OrderId) -> bool {
        self.cancel_at(id, Timestamp::now())
    }

    /// Cancel an order as of an explicit point in time. See [`Self::cancel`].
    pub fn cancel_at(&mut self, id: &OrderId, now: Timestamp) -> bool {
        match self.orders.iter_mut().find(|order| &order.id == id) {
            Some(order) if order.cancellable_at(now) => {
                order.status = OrderStatus::Cancelled;

                info!(order_id = %id, "cancelled order");
            }
            _ => {
                debug!(order_id = %id, "cancellation had no effect");
            }
        }

        true
    }

    /// Drive a fulfilment transition from outside, e.g. by an admin tool or a
    /// fulfilment system.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError` if the order does not exist or the lifecycle
    /// does not allow the transition.
    pub fn set_status(&mut self, id: &OrderId, next: OrderStatus) -> Result<(), OrderError> {
        let order = self
            .orders
            .iter_mut()
            .find(|order| &order.id == id)
            .ok_or_else(|| OrderError::NotFound(id.clone()))?;

        if !order.status.can_become(next) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        order.status = next;

        info!(order_id = %id, status = %next, "order status changed");

        Ok(())
    }

    /// All orders, newest first.
    pub fn orders(&self) -> &[Order<'a>] {
        &self.orders
    }

    /// Look up a single order.
    pub fn get(&self, id: &OrderId) -> Option<&Order<'a>> {
        self.orders.iter().find(|order| &order.id == id)
    }

    /// Number of orders placed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if no orders have been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the currency of the order book.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }
}
