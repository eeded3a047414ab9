// JWT session token generation and validation

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{error::AuthError, models::Identity};
use crate::config::SESSION_TTL_SECS;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid, // user id
    pub username: String,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

impl Claims {
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub,
            username: self.username.clone(),
        }
    }
}

/// Token service for HS256 session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a new TokenService; tokens expire 7 days after issuance
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: SESSION_TTL_SECS,
        }
    }

    /// Issue a token for `identity`, valid from now
    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now().timestamp())
    }

    /// Issue a token as if at `issued_at` (unix seconds).
    /// Same identity, secret and timestamp always produce the same token.
    pub fn issue_at(&self, identity: &Identity, issued_at: i64) -> Result<String, AuthError> {
        let claims = Claims {
            sub: identity.id,
            username: identity.username.clone(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Validate a token: signature must verify and now must be before `exp`.
    /// Every failure collapses to `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        // expiry is compared against `now` below so tests can pin the clock
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {:?}", e.kind());
                AuthError::InvalidToken
            })?;

        if now >= claims.exp {
            tracing::debug!("Token rejected: expired");
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }
}
