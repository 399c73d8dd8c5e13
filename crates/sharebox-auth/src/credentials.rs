//! Credential service: password hashing and bearer tokens

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};
use crate::identity::Identity;

/// Token lifetime when none is configured
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 12;

/// Claims carried by a bearer token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User key
    pub sub: String,
    pub username: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expires at (Unix seconds)
    pub exp: i64,
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub.clone(), self.username.clone())
    }
}

/// Verifies identity and issues/validates opaque bearer tokens
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> AuthResult<String>;

    /// Check a password against a stored hash
    ///
    /// A malformed stored hash is an error; a wrong password is `Ok(false)`.
    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool>;

    fn issue_token(&self, identity: &Identity) -> AuthResult<String>;

    /// Decode and check a token
    ///
    /// Fails with `Unauthorized("expired")` or `Unauthorized("invalid")`.
    fn validate_token(&self, token: &str) -> AuthResult<Claims>;
}

/// Argon2id password hashes and HS256 JSON Web Tokens
pub struct JwtCredentials {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: TimeDelta,
    argon2: Argon2<'static>,
}

impl JwtCredentials {
    pub fn new(secret: &[u8], ttl: TimeDelta) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            argon2: Argon2::default(),
        }
    }

    /// Override the Argon2id cost parameters used for new hashes
    ///
    /// Existing hashes keep verifying with the parameters encoded in them.
    pub fn with_argon2_params(mut self, params: Params) -> Self {
        self.argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        self
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }
}

impl CredentialService for JwtCredentials {
    fn hash_password(&self, password: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Credential(format!("password hashing failed: {e}")))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AuthError::Credential(format!("malformed password hash: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AuthError::Credential(format!(
                "password verification failed: {e}"
            ))),
        }
    }

    fn issue_token(&self, identity: &Identity) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.user_key.clone(),
            username: identity.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Credential(format!("token encoding failed: {e}")))
    }

    fn validate_token(&self, token: &str) -> AuthResult<Claims> {
        let validation = Validation::default();

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(AuthError::Unauthorized("expired".into()))
            }
            Err(e) => {
                tracing::debug!("Rejected bearer token: {e}");
                Err(AuthError::Unauthorized("invalid".into()))
            }
        }
    }
}
