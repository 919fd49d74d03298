//! Checkout
//!
//! A two-step wizard: the address form, then the payment form. The final
//! submit charges the payment boundary, snapshots the cart into an order and
//! clears the cart. There is no compensating action after placement; a
//! gateway failure propagates before any local state is touched.

use thiserror::Error;
use tracing::info;

use crate::{
    cart::{Cart, CartError},
    gateways::{PaymentError, PaymentProcessor},
    orders::{Address, OrderBook, OrderError, OrderId, PaymentMethod},
};

/// Country preselected in the address form.
pub const DEFAULT_COUNTRY: &str = "US";

/// Checkout wizard errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// Payment was submitted before the address step.
    #[error("the address step has not been completed")]
    AddressIncomplete,

    /// The wizard already produced an order.
    #[error("this checkout has already been completed")]
    AlreadyComplete,

    /// Wrapped cart error.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Wrapped order error.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Wrapped payment gateway error.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Step one of the wizard. Everything except country and phone is required;
/// a blank country falls back to [`DEFAULT_COUNTRY`], and the phone number is
/// collected for the courier but is not part of the address value.
#[derive(Debug, Clone, Default)]
pub struct AddressForm {
    /// Street and number
    pub street: String,

    /// City
    pub city: String,

    /// State or region
    pub state: String,

    /// Postal code
    pub zip_code: String,

    /// Country code; blank means [`DEFAULT_COUNTRY`]
    pub country: String,

    /// Optional contact number
    pub phone: String,
}

fn required(field: &'static str, value: &str) -> Result<String, CheckoutError> {
    if value.trim().is_empty() {
        return Err(CheckoutError::MissingField(field));
    }

    Ok(value.to_string())
}

impl AddressForm {
    /// Validate the form into an [`Address`].
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError::MissingField` naming the first blank
    /// required field.
    pub fn validate(&self) -> Result<Address, CheckoutError> {
        let country = if self.country.trim().is_empty() {
            DEFAULT_COUNTRY.to_string()
        } else {
            self.country.clone()
        };

        Ok(Address {
            street: required("street", &self.street)?,
            city: required("city", &self.city)?,
            state: required("state", &self.state)?,
            zip_code: required("zip code", &self.zip_code)?,
            country,
        })
    }
}

/// Step two of the wizard. Card fields are required only when paying by
/// credit card; they are forwarded to the payment boundary and never stored.
#[derive(Debug, Clone)]
pub struct PaymentForm {
    /// Selected payment method
    pub method: PaymentMethod,

    /// Name on the card
    pub card_name: String,

    /// Card number
    pub card_number: String,

    /// Expiry, MM/YY
    pub expiry_date: String,

    /// Security code
    pub cvv: String,
}

impl Default for PaymentForm {
    fn default() -> Self {
        Self {
            method: PaymentMethod::CreditCard,
            card_name: String::new(),
            card_number: String::new(),
            expiry_date: String::new(),
            cvv: String::new(),
        }
    }
}

impl PaymentForm {
    /// Validate the form into the chosen [`PaymentMethod`].
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError::MissingField` when a card field is blank
    /// while credit card is selected.
    pub fn validate(&self) -> Result<PaymentMethod, CheckoutError> {
        if self.method == PaymentMethod::CreditCard {
            required("name on card", &self.card_name)?;
            required("card number", &self.card_number)?;
            required("expiry date", &self.expiry_date)?;
            required("cvv", &self.cvv)?;
        }

        Ok(self.method)
    }
}

/// Where the wizard currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    /// Collecting the shipping address
    Address,

    /// Collecting the payment method
    Payment,

    /// Done; the order id is available
    Complete(OrderId),
}

/// The checkout wizard.
#[derive(Debug)]
pub struct Checkout {
    step: CheckoutStep,
    address: Option<Address>,
}

impl Default for Checkout {
    fn default() -> Self {
        Self::new()
    }
}

impl Checkout {
    /// Start a checkout at the address step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Address,
            address: None,
        }
    }

    /// Current wizard step.
    pub fn step(&self) -> CheckoutStep {
        self.step.clone()
    }

    /// Submit the address step and advance to payment.
    ///
    /// Re-submitting from the payment step is allowed; that is the shopper
    /// going back to correct a field.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` when the form is invalid or the checkout is
    /// already complete.
    pub fn submit_address(&mut self, form: &AddressForm) -> Result<(), CheckoutError> {
        if matches!(self.step(), CheckoutStep::Complete(_)) {
            return Err(CheckoutError::AlreadyComplete);
        }

        let address = form.validate()?;

        self.address = Some(address);
        self.step = CheckoutStep::Payment;

        Ok(())
    }

    /// Go back from payment to the address step, keeping what was entered.
    pub fn back_to_address(&mut self) {
        if self.step() == CheckoutStep::Payment {
            self.step = CheckoutStep::Address;
        }
    }

    /// Submit the payment step: charge the processor, place the order from a
    /// snapshot of the cart, then clear the cart.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` when called out of order, when the form is
    /// invalid, or when the charge or placement fails. On failure the cart
    /// and order list are untouched.
    #[tracing::instrument(name = "checkout.submit_payment", skip_all, err)]
    pub async fn submit_payment<'a, P>(
        &mut self,
        form: &PaymentForm,
        cart: &mut Cart<'a>,
        orders: &mut OrderBook<'a>,
        payments: &P,
    ) -> Result<OrderId, CheckoutError>
    where
        P: PaymentProcessor + ?Sized,
    {
        match self.step() {
            CheckoutStep::Complete(_) => return Err(CheckoutError::AlreadyComplete),
            CheckoutStep::Address => return Err(CheckoutError::AddressIncomplete),
            CheckoutStep::Payment => {}
        }

        let method = form.validate()?;

        let address = self
            .address
            .clone()
            .ok_or(CheckoutError::AddressIncomplete)?;

        let total = cart.total()?;

        payments
            .charge(total.to_minor_units(), total.currency().iso_alpha_code)
            .await?;

        let id = orders.place(cart.snapshot(), address, method)?;

        cart.clear();

        self.step = CheckoutStep::Complete(id.clone());

        info!(order_id = %id, "checkout complete");

        Ok(id)
    }
}
