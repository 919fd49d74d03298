//! Gateways
//!
//! External collaborators behind trait boundaries: the authentication backend,
//! the payment processor and the notification service for custom-order
//! requests. The bundled implementations are simulated stand-ins that always
//! succeed after a fixed delay; the delays live here and nowhere else, so a
//! real backend can satisfy the same contract without inheriting them.

use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

/// Simulated round-trip to the authentication backend.
pub const SIMULATED_AUTH_LATENCY: Duration = Duration::from_secs(1);

/// Simulated round-trip to the payment processor.
pub const SIMULATED_CHARGE_LATENCY: Duration = Duration::from_secs(2);

/// Simulated round-trip to the notification service.
pub const SIMULATED_NOTIFY_LATENCY: Duration = Duration::from_secs(2);

/// The signed-in shopper as reported by the authentication backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Backend-assigned identifier
    pub id: i64,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,
}

/// A bespoke-piece enquiry submitted through the notification service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomOrderRequest {
    /// Requester name
    pub name: String,

    /// Requester email
    pub email: String,

    /// Craft category the piece belongs to
    pub category: String,

    /// What the requester wants made
    pub description: String,

    /// Optional phone number
    pub phone: Option<String>,

    /// Optional budget range
    pub budget: Option<String>,

    /// Optional timeline
    pub timeline: Option<String>,

    /// Optional links to inspiration pieces
    pub inspiration: Option<String>,

    /// Optional preferred materials
    pub materials: Option<String>,

    /// Optional dimensions
    pub dimensions: Option<String>,
}

/// Authentication backend errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    /// The backend rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The backend could not be reached.
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Payment processor errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The charge was refused.
    #[error("payment was declined: {0}")]
    Declined(String),

    /// The processor could not be reached.
    #[error("payment service unavailable: {0}")]
    Unavailable(String),
}

/// Notification service errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotifyError {
    /// The service could not be reached.
    #[error("notification service unavailable: {0}")]
    Unavailable(String),
}

/// Authentication backend boundary.
#[automock]
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Check credentials and return the shopper's profile.
    async fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile, AuthError>;

    /// Create an account and return the new profile.
    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError>;
}

/// Payment processor boundary.
#[automock]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge the given amount, expressed in minor units of `currency`.
    async fn charge(&self, amount_minor: i64, currency: &str) -> Result<(), PaymentError>;
}

/// Notification service boundary.
#[automock]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Forward a custom-order enquiry to the workshop.
    async fn notify(&self, request: &CustomOrderRequest) -> Result<(), NotifyError>;
}

/// Simulated authentication backend: any non-empty email and password pair is
/// accepted, and the display name is the local part of the email.
#[derive(Debug, Clone)]
pub struct StubAuthenticator {
    latency: Duration,
}

impl StubAuthenticator {
    /// Stub with the production-like simulated latency.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: SIMULATED_AUTH_LATENCY,
        }
    }

    /// Stub with a custom latency; use `Duration::ZERO` in tests.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for StubAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for StubAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        sleep(self.latency).await;

        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let name = email.split('@').next().unwrap_or(email).to_string();

        Ok(UserProfile {
            id: 1,
            name,
            email: email.to_string(),
        })
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        sleep(self.latency).await;

        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(UserProfile {
            id: Timestamp::now().as_millisecond(),
            name: name.to_string(),
            email: email.to_string(),
        })
    }
}

/// Simulated payment processor: every charge succeeds after the delay.
#[derive(Debug, Clone)]
pub struct StubPaymentProcessor {
    latency: Duration,
}

impl StubPaymentProcessor {
    /// Stub with the production-like simulated latency.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: SIMULATED_CHARGE_LATENCY,
        }
    }

    /// Stub with a custom latency; use `Duration::ZERO` in tests.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for StubPaymentProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentProcessor for StubPaymentProcessor {
    async fn charge(&self, amount_minor: i64, currency: &str) -> Result<(), PaymentError> {
        sleep(self.latency).await;

        debug!(amount_minor, currency, "simulated charge accepted");

        Ok(())
    }
}

/// Simulated notification service: every enquiry is accepted after the delay.
#[derive(Debug, Clone)]
pub struct StubNotifier {
    latency: Duration,
}

impl StubNotifier {
    /// Stub with the production-like simulated latency.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: SIMULATED_NOTIFY_LATENCY,
        }
    }

    /// Stub with a custom latency; use `Duration::ZERO` in tests.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for StubNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for StubNotifier {
    async fn notify(&self, request: &CustomOrderRequest) -> Result<(), NotifyError> {
        sleep(self.latency).await;

        debug!(email = %request.email, category = %request.category, "custom order enquiry sent");

        Ok(())
    }
}
