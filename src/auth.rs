use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};

use crate::{
    error::AuthError,
    token::{Claims, TokenService},
};

/// AuthUser Extractor Result
///
/// The verified identity of a request. Authorization in this service is claim-based:
/// whoever holds a valid token is the `email` inside it, and that email is the only
/// thing compared against resource owners.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    /// The identity claim taken from the token.
    pub email: String,
    /// The full decoded token payload.
    pub claims: Claims,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email.clone(),
            claims,
        }
    }
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument and as the argument of
/// `auth_middleware`. The steps are:
/// 1. Reuse an identity already attached to the request by the middleware.
/// 2. Read the `Authorization` header. Absent means `MissingToken` (401).
/// 3. Require the `Bearer ` scheme and verify the token. Any failure past this
///    point means the caller presented bad credentials: `Unauthenticated` (403).
/// 4. Attach the identity to the request extensions for downstream extractors.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AuthError::Unauthenticated)?;

        let claims = TokenService::from_ref(state)
            .verify(token)
            .map_err(|_| AuthError::Unauthenticated)?;

        let user = AuthUser::from(claims);
        tracing::debug!(email = %user.email, "identity verified");
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// require_ownership
///
/// Allows the request only when the verified identity is the declared owner of the
/// resource. Comparison is exact: no case folding or trimming.
pub fn require_ownership(identity: &AuthUser, owner_email: &str) -> Result<(), AuthError> {
    if identity.email == owner_email {
        Ok(())
    } else {
        tracing::warn!(
            caller = %identity.email,
            owner = %owner_email,
            "ownership check failed"
        );
        Err(AuthError::Forbidden)
    }
}
