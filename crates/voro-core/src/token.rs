//! Intake token codec.
//!
//! An intake token is a compact HS256 JWS binding an email address to a
//! short lifetime. It travels inside the auto-reply link and comes back with
//! the intake form, proving the submitter controls the inbox the link was
//! mailed to.
//!
//! # Security model
//!
//! - Tokens are self-contained and never stored. There is no revocation list
//!   and no single-use guarantee: a link may be reopened until it expires.
//! - Verification failures collapse into [`TokenError::Invalid`]. Whether the
//!   signature, the structure, or the expiry was at fault is logged at debug
//!   level and never returned to the caller.
//! - Expiry is checked with zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TokenError;

/// Default token lifetime in days.
pub const DEFAULT_TTL_DAYS: i64 = 7;

/// Claims carried by an intake token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeClaims {
    /// The inquirer's email address.
    pub email: String,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Issues and verifies intake tokens with a symmetric secret.
///
/// A codec built without a secret still constructs; every operation then
/// fails with [`TokenError::SecretMissing`], so a misconfigured deployment
/// boots and reports the problem on the first request that needs a token.
pub struct TokenCodec {
    keys: Option<Keys>,
    ttl: Duration,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the configured secret. Empty secrets count as absent.
    #[must_use]
    pub fn new(secret: Option<&str>) -> Self {
        let keys = secret.filter(|s| !s.is_empty()).map(|s| Keys {
            encoding: EncodingKey::from_secret(s.as_bytes()),
            decoding: DecodingKey::from_secret(s.as_bytes()),
        });

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat"]);

        Self {
            keys,
            ttl: Duration::days(DEFAULT_TTL_DAYS),
            validation,
        }
    }

    /// Override the token lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Whether a signing secret is available.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    /// The lifetime applied to newly issued tokens.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `email`, valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SecretMissing`] without a secret, or
    /// [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token for `email` as if it had been issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Same as [`issue`](Self::issue).
    pub fn issue_at(&self, email: &str, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::SecretMissing)?;

        let claims = IntakeClaims {
            email: email.to_owned(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding).map_err(
            |e| TokenError::Signing {
                reason: e.to_string(),
            },
        )
    }

    /// Verify `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::SecretMissing`] without a secret and
    /// [`TokenError::Invalid`] for any signature, structure, or expiry fault.
    pub fn verify(&self, token: &str) -> Result<IntakeClaims, TokenError> {
        let keys = self.keys.as_ref().ok_or(TokenError::SecretMissing)?;

        let data = jsonwebtoken::decode::<IntakeClaims>(token, &keys.decoding, &self.validation)
            .map_err(|e| {
                debug!(reason = %e, "intake token rejected");
                TokenError::Invalid
            })?;

        if data.claims.email.trim().is_empty() {
            debug!("intake token rejected: empty email claim");
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("configured", &self.keys.is_some())
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
