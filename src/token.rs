use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    error::AuthError,
    models::{Document, User},
};

/// Lifetime of every issued token: one day.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Claims
///
/// The payload signed into every identity token: the user's profile as it was
/// saved, the `email` identity claim, and the standard `iat`/`exp` timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The identity claim. Ownership checks compare against this value.
    pub email: String,
    /// Issued At (seconds since the epoch). Zero when the token carries none.
    #[serde(default)]
    pub iat: usize,
    /// Expiration Time (seconds since the epoch).
    pub exp: usize,
    /// Remaining profile fields, echoed back to the client.
    #[serde(flatten)]
    pub profile: Document,
}

/// TokenService
///
/// Issues and verifies HS256 identity tokens with a server-held secret. It holds no
/// mutable state, so one instance is cloned into every request.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        // Signature and expiry only. Profile keys such as `aud` ride along as data.
        let mut validation = Validation::default();
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// issue
    ///
    /// Signs the user's profile with a fixed one-day expiry. Profile keys that
    /// collide with the reserved claims are replaced by the service's own values.
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let mut profile = user.profile.clone();
        for reserved in ["email", "iat", "exp"] {
            profile.remove(reserved);
        }

        let claims = Claims {
            email: user.email.clone(),
            iat: now as usize,
            exp: (now + TOKEN_TTL_SECS) as usize,
            profile,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(AuthError::Signing)
    }

    /// verify
    ///
    /// Checks signature and expiry and returns the embedded claims.
    /// An empty token is `MissingToken`; anything that fails to decode is `Unauthenticated`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token failed verification");
                AuthError::Unauthenticated
            })
    }
}
