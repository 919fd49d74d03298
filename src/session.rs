//! Session
//!
//! One authentication session per storefront. Form-level validation happens
//! here; credential checking is delegated to the [`Authenticator`] boundary.

use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::gateways::{AuthError, Authenticator, UserProfile};

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Sign-in and registration errors. The messages are shown to the shopper
/// verbatim, next to the form field that caused them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A required field was left blank.
    #[error("Please fill in all fields")]
    MissingFields,

    /// Password and confirmation differ.
    #[error("Passwords do not match")]
    PasswordMismatch,

    /// Password is shorter than the minimum.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters long")]
    PasswordTooShort,

    /// The backend rejected the request.
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Authentication session state.
pub struct Session {
    authenticator: Arc<dyn Authenticator>,
    user: Option<UserProfile>,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("user", &self.user).finish()
    }
}

impl Session {
    /// Create a signed-out session over the given backend.
    #[must_use]
    pub fn new(authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            authenticator,
            user: None,
        }
    }

    /// Sign in.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError::MissingFields` when either field is blank,
    /// or the backend's error when the credentials are rejected.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<&UserProfile, SessionError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(SessionError::MissingFields);
        }

        let profile = self.authenticator.authenticate(email, password).await?;

        info!(user_id = profile.id, "signed in");

        Ok(self.user.insert(profile))
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns a `SessionError` when a field is blank, the passwords do not
    /// match, the password is too short, or the backend rejects the request.
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<&UserProfile, SessionError> {
        if name.trim().is_empty()
            || email.trim().is_empty()
            || password.is_empty()
            || confirm_password.is_empty()
        {
            return Err(SessionError::MissingFields);
        }

        if password != confirm_password {
            return Err(SessionError::PasswordMismatch);
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(SessionError::PasswordTooShort);
        }

        let profile = self.authenticator.register(name, email, password).await?;

        info!(user_id = profile.id, "registered");

        Ok(self.user.insert(profile))
    }

    /// Sign out; a no-op when nobody is signed in.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!(user_id = user.id, "signed out");
        }
    }

    /// The signed-in shopper, if any.
    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Whether somebody is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use crate::gateways::{MockAuthenticator, StubAuthenticator};

    use super::*;

    fn stub_session() -> Session {
        Session::new(Arc::new(StubAuthenticator::with_latency(Duration::ZERO)))
    }

    #[tokio::test]
    async fn login_with_valid_credentials_signs_in() -> TestResult {
        let mut session = stub_session();

        let profile = session.login("jane@example.com", "hunter42").await?;

        assert_eq!(profile.name, "jane");
        assert!(session.is_authenticated(), "session should be signed in");

        Ok(())
    }

    #[tokio::test]
    async fn login_with_blank_fields_is_rejected_locally() {
        let mut session = stub_session();

        let result = session.login("", "hunter42").await;

        assert_eq!(result.err(), Some(SessionError::MissingFields));

        let result = session.login("jane@example.com", "").await;

        assert_eq!(result.err(), Some(SessionError::MissingFields));
        assert!(!session.is_authenticated(), "session should stay signed out");
    }

    #[tokio::test]
    async fn register_rejects_mismatched_passwords() {
        let mut session = stub_session();

        let result = session
            .register("Jane Doe", "jane@example.com", "hunter42", "hunter43")
            .await;

        assert_eq!(result.err(), Some(SessionError::PasswordMismatch));
    }

    #[tokio::test]
    async fn register_rejects_short_passwords() {
        let mut session = stub_session();

        let result = session
            .register("Jane Doe", "jane@example.com", "abc", "abc")
            .await;

        assert_eq!(result.err(), Some(SessionError::PasswordTooShort));
    }

    #[tokio::test]
    async fn register_rejects_blank_fields() {
        let mut session = stub_session();

        let result = session
            .register("", "jane@example.com", "hunter42", "hunter42")
            .await;

        assert_eq!(result.err(), Some(SessionError::MissingFields));
    }

    #[tokio::test]
    async fn register_signs_the_new_account_in() -> TestResult {
        let mut session = stub_session();

        session
            .register("Jane Doe", "jane@example.com", "hunter42", "hunter42")
            .await?;

        assert_eq!(
            session.user().map(|user| user.name.as_str()),
            Some("Jane Doe")
        );

        Ok(())
    }

    #[tokio::test]
    async fn logout_clears_the_user() -> TestResult {
        let mut session = stub_session();

        session.login("jane@example.com", "hunter42").await?;
        session.logout();

        assert!(session.user().is_none(), "user should be cleared");

        Ok(())
    }

    #[tokio::test]
    async fn backend_failures_propagate() {
        let mut backend = MockAuthenticator::new();

        backend
            .expect_authenticate()
            .returning(|_, _| Err(AuthError::Unavailable("connection refused".to_string())));

        let mut session = Session::new(Arc::new(backend));

        let result = session.login("jane@example.com", "hunter42").await;

        assert_eq!(
            result.err(),
            Some(SessionError::Auth(AuthError::Unavailable(
                "connection refused".to_string()
            )))
        );
        assert!(!session.is_authenticated(), "session should stay signed out");
    }
}
