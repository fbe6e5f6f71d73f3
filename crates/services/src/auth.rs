//! Interface to the external authentication collaborator.
//!
//! The provider is opaque: promise-like calls that resolve to the
//! resulting identity or an error. The progress store does not talk to it
//! directly — the presentation layer drives sign-in/out and forwards each
//! identity transition via [`ProgressService::identity_changed`].
//!
//! [`ProgressService::identity_changed`]: crate::progress::ProgressService::identity_changed

use async_trait::async_trait;

use crate::error::AuthError;
use tracker_core::model::Identity;

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The identity the provider currently holds a session for.
    async fn current_identity(&self) -> Identity;

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a rejected login, or a
    /// transport error.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the signup or the
    /// request fails.
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// End the current session. Resolves to `Identity::Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the provider call fails.
    async fn sign_out(&self) -> Result<Identity, AuthError>;

    /// Trigger the provider's password-recovery flow for an email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the request fails.
    async fn request_password_reset(&self, email: &str) -> Result<(), AuthError>;
}

/// Provider double that always reports a fixed identity; for tests and
/// offline development.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthProvider {
    identity: Identity,
}

impl StaticAuthProvider {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl AuthProvider for StaticAuthProvider {
    async fn current_identity(&self) -> Identity {
        self.identity.clone()
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<Identity, AuthError> {
        Ok(self.identity.clone())
    }

    async fn sign_out(&self) -> Result<Identity, AuthError> {
        Ok(Identity::Anonymous)
    }

    async fn request_password_reset(&self, _email: &str) -> Result<(), AuthError> {
        Ok(())
    }
}
