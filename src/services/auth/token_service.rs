//! HS256 access-token issuance and verification.
//!
//! Issue and verify share one process-wide symmetric secret. Claims are just
//! `sub` + `exp`; anything beyond that is out of scope for this service.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{error::Error as StdError, fmt};
use tracing::error;

/// Errors surfaced by token issuance and verification.
///
/// Verification failures all collapse to a uniform 401 at the HTTP boundary;
/// the distinction exists for logging. `Signing` is the odd one out: it is a
/// server-side failure and maps to 500.
#[derive(Debug)]
pub enum TokenError {
    /// Token header declares something other than the HMAC family
    /// (guards against alg-substitution, including `none`).
    InvalidSignatureMethod,
    InvalidSignature,
    Expired,
    /// Undecodable payload, or a missing/empty/mistyped `sub` or `exp`.
    MalformedClaims,
    Signing(jsonwebtoken::errors::Error),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSignatureMethod => write!(f, "unexpected signing algorithm"),
            Self::InvalidSignature => write!(f, "signature verification failed"),
            Self::Expired => write!(f, "token expired"),
            Self::MalformedClaims => write!(f, "malformed claims"),
            Self::Signing(e) => write!(f, "failed to sign token: {}", e),
        }
    }
}

impl StdError for TokenError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Signing(e) => Some(e),
            _ => None,
        }
    }
}

impl TokenError {
    fn from_verify(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                Self::InvalidSignatureMethod
            }
            // Base64/Json/Utf8/MissingRequiredClaim and anything else the
            // parser trips on: fail closed as malformed.
            _ => Self::MalformedClaims,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccessTokenClaims {
    sub: String,
    exp: i64,
}

/// Symmetric (HS256) token service.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenService")
            .field("validation", &self.validation)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenService {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected the moment `exp` passes,
        // never before. (jsonwebtoken defaults to 60s of leeway.)
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Issue a token for an already-authenticated subject.
    ///
    /// `exp` is absolute seconds-since-epoch, `now + ttl`.
    pub fn issue(&self, sub: &str) -> Result<String, TokenError> {
        let claims = AccessTokenClaims {
            sub: sub.to_string(),
            exp: Utc::now().timestamp() + self.ttl_seconds as i64,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(
            |e| {
                error!(error = %e, "failed to sign access token");
                TokenError::Signing(e)
            },
        )
    }

    /// Verify a presented token and return its subject.
    ///
    /// `jsonwebtoken::Validation` already checks:
    /// - declared algorithm is HS256 (anything else, `none` included, fails)
    /// - signature against the shared secret
    /// - `exp` (required claim, no leeway)
    ///
    /// This method additionally rejects an empty `sub`.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        let data = jsonwebtoken::decode::<AccessTokenClaims>(
            token,
            &self.decoding_key,
            &self.validation,
        )
        .map_err(TokenError::from_verify)?;

        let sub = data.claims.sub;
        if sub.trim().is_empty() {
            return Err(TokenError::MalformedClaims);
        }

        Ok(sub)
    }
}
