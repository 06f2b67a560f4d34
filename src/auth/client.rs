//! Auth sub-client — login, registration, logout, session checks.

use crate::auth::{
    jwt, CredentialStore, LoginRequest, RefreshOutcome, RegisterRequest, TokenResponse, User,
};
use crate::client::DigitizerClient;
use crate::error::{AuthError, HttpError, SdkError};
use crate::network::{REGISTER_PATH, TOKEN_PATH};

/// Sub-client for authentication operations.
pub struct Auth<'a> {
    pub(crate) client: &'a DigitizerClient,
}

impl<'a> Auth<'a> {
    /// Exchange username/password for a token pair and persist both tokens.
    ///
    /// Rejected credentials surface as [`AuthError::LoginFailed`] carrying the
    /// backend message.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), SdkError> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };

        let tokens: TokenResponse = self
            .client
            .http
            .post_anonymous(TOKEN_PATH, &request)
            .await
            .map_err(login_error)?;

        self.client.store.store_pair(&tokens.into())?;
        tracing::info!(username, "Logged in");
        Ok(())
    }

    /// Create an account. Field-level rejections come back as
    /// [`HttpError::Validation`].
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SdkError> {
        let request = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let user: User = self
            .client
            .http
            .post_anonymous(REGISTER_PATH, &request)
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "Registered account");
        Ok(user)
    }

    /// Register, then log in with the same credentials.
    pub async fn register_and_login(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, SdkError> {
        let user = self.register(username, email, password).await?;
        self.login(username, password).await?;
        Ok(user)
    }

    /// Clear both tokens and send the navigator to the login route.
    pub fn logout(&self) -> Result<(), SdkError> {
        self.client.store.clear()?;
        tracing::info!("Logged out");
        self.client.navigator.navigate(&self.client.login_route);
        Ok(())
    }

    /// Whether an access token is stored. Says nothing about its validity.
    pub fn is_authenticated(&self) -> bool {
        self.client.store.access_token().is_some()
    }

    /// Proactive session check.
    ///
    /// Returns `true` when the stored access token is unexpired, or when it has
    /// expired and a refresh succeeds. A failed refresh clears the credentials.
    pub async fn ensure_session(&self) -> Result<bool, SdkError> {
        match self.require_session().await {
            Ok(()) => Ok(true),
            Err(SdkError::Auth(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Like [`ensure_session`](Self::ensure_session) but reports why the
    /// session is unusable.
    pub async fn require_session(&self) -> Result<(), SdkError> {
        let store = &self.client.store;
        let access = store.access_token().ok_or(AuthError::NotAuthenticated)?;
        if !jwt::is_expired(&access) {
            return Ok(());
        }

        match self.client.refresher.refresh_stale(Some(&access)).await {
            None => {
                store.clear()?;
                Err(AuthError::NotAuthenticated.into())
            }
            Some(RefreshOutcome::Success(_)) => Ok(()),
            Some(RefreshOutcome::Failure(e)) => {
                tracing::warn!(error = %e, "Session expired and could not be refreshed");
                Err(AuthError::TokenExpired.into())
            }
        }
    }
}

fn login_error(e: HttpError) -> SdkError {
    match e {
        HttpError::Validation { errors, .. } => {
            let message = errors
                .general()
                .and_then(|msgs| msgs.first().cloned())
                .unwrap_or_else(|| errors.to_string());
            AuthError::LoginFailed(message).into()
        }
        HttpError::Unauthorized(msg) => AuthError::LoginFailed(msg).into(),
        other => other.into(),
    }
}
