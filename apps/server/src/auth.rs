//! Bearer JWT authentication.
//!
//! Tokens are issued by the external identity provider and validated here
//! against a shared secret. The server itself never issues tokens; it
//! only resolves the caller identity carried by the `sub` claim.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Display name, when the provider includes one
    #[serde(default)]
    pub name: Option<String>,

    /// Email, when the provider includes one
    #[serde(default)]
    pub email: Option<String>,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// The resolved caller identity, extracted from the bearer token.
///
/// Every protected handler takes this as an argument; axum rejects the
/// request with 401 before the handler body runs when the token is
/// missing, malformed, expired, or signed with the wrong secret.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Validates a bearer token against the shared secret.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let token_data: TokenData<Claims> = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| ApiError::unauthorized(format!("Invalid token: {e}")))?;

    Ok(token_data.claims)
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        let claims = validate_token(token, &state.config.jwt_secret)?;

        Ok(Identity {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        })
    }
}
