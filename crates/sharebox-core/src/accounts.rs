//! Account registration, login, and bearer token resolution

use std::sync::Arc;

use serde::Serialize;
use sharebox_auth::{Catalog, CredentialService, Identity};
use sharebox_records::RecordStore;

use crate::error::{LifecycleError, LifecycleResult};

/// Login response body
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginToken {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: String,
}

impl LoginToken {
    fn bearer(token: String) -> Self {
        Self {
            token,
            token_type: "Bearer".into(),
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    catalog: Catalog,
    credentials: Arc<dyn CredentialService>,
}

impl AccountService {
    pub fn new(records: Arc<dyn RecordStore>, credentials: Arc<dyn CredentialService>) -> Self {
        Self {
            catalog: Catalog::new(records),
            credentials,
        }
    }

    /// Create a user with a unique username
    pub async fn register(&self, username: &str, password: &str) -> LifecycleResult<Identity> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(LifecycleError::BadRequest(
                "Username and password are required".into(),
            ));
        }
        if self.catalog.find_user_by_username(username).await?.is_some() {
            return Err(LifecycleError::UserExists);
        }

        let credentials = self.credentials.clone();
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || credentials.hash_password(&password))
            .await
            .map_err(|e| LifecycleError::Credential(format!("hashing task failed: {e}")))??;

        let user = self.catalog.insert_user(username, &hash).await?;
        tracing::info!(user = %user.key, username, "Registered user");
        Ok(Identity::from(&user))
    }

    /// Exchange a username and password for a bearer token
    ///
    /// An unknown user and a wrong password fail the same way.
    pub async fn login(&self, username: &str, password: &str) -> LifecycleResult<LoginToken> {
        let Some(user) = self.catalog.find_user_by_username(username.trim()).await? else {
            tracing::debug!(username, "Login for unknown user");
            return Err(LifecycleError::InvalidCredentials);
        };

        let credentials = self.credentials.clone();
        let password = password.to_string();
        let stored = user.password_hash.clone();
        let valid =
            tokio::task::spawn_blocking(move || credentials.verify_password(&password, &stored))
                .await
                .map_err(|e| LifecycleError::Credential(format!("verify task failed: {e}")))??;

        if !valid {
            tracing::debug!(username, "Login with wrong password");
            return Err(LifecycleError::InvalidCredentials);
        }

        let token = self.credentials.issue_token(&Identity::from(&user))?;
        tracing::info!(user = %user.key, "User logged in");
        Ok(LoginToken::bearer(token))
    }

    /// Resolve a bearer token to the identity it was issued for
    ///
    /// Tokens of deleted users are rejected.
    pub async fn authenticate(&self, token: &str) -> LifecycleResult<Identity> {
        let claims = self.credentials.validate_token(token)?;
        match self.catalog.get_user(&claims.sub).await? {
            Some(user) => Ok(Identity::from(&user)),
            None => Err(LifecycleError::Unauthorized("invalid".into())),
        }
    }

    pub async fn list_usernames(&self) -> LifecycleResult<Vec<String>> {
        let users = self.catalog.list_users().await?;
        Ok(users.into_iter().map(|u| u.username).collect())
    }
}
