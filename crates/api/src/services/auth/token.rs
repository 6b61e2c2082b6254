//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs carrying `{"userId": <id>, "exp": <unix seconds>}`.
//! Verification pins the algorithm, so a token signed with anything other
//! than HS256 (including `none` or an asymmetric scheme) is rejected.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bazaar_core::UserId;

/// Errors from issuing or verifying a token.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong signature, or signed with an unexpected algorithm.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token's expiry has passed.
    #[error("token expired")]
    Expired,

    /// The token or its claims could not be decoded.
    #[error("malformed token")]
    Malformed,

    /// Any other structural violation.
    #[error("invalid token")]
    Invalid,

    /// Signing failed.
    #[error("failed to sign token")]
    Signing,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(rename = "userId")]
    user_id: i32,
    exp: i64,
}

/// Issues and verifies bearer tokens with a process-wide HMAC secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Issue a token for `user_id`, valid for the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issue a token as if it were `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue_at(&self, user_id: UserId, issued_at: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            user_id: user_id.as_i32(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token and return the user it was issued for.
    ///
    /// # Errors
    ///
    /// Returns a [`TokenError`] describing why the token was rejected.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::InvalidSignature
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_)
                | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
                _ => TokenError::Invalid,
            }
        })?;

        Ok(UserId::new(data.claims.user_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(
            &SecretString::from("kT9#mQ2$vL8@xR4!nW6^pZ1&cF5*hJ3%"),
            Duration::hours(72),
        )
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens.issue(UserId::new(42)).unwrap();
        assert_eq!(tokens.verify(&token).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_claims_use_user_id_key() {
        let json = serde_json::to_value(Claims {
            user_id: 7,
            exp: 1,
        })
        .unwrap();
        assert_eq!(json["userId"], 7);
    }

    #[test]
    fn test_expired_token() {
        let tokens = service();
        let issued_at = Utc::now() - Duration::hours(73);
        let token = tokens.issue_at(UserId::new(1), issued_at).unwrap();
        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_other_secret_rejected() {
        let other = TokenService::new(
            &SecretString::from("a-completely-different-signing-secret"),
            Duration::hours(72),
        );
        let token = other.issue(UserId::new(1)).unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_unexpected_algorithm_rejected() {
        let secret = "kT9#mQ2$vL8@xR4!nW6^pZ1&cF5*hJ3%";
        let claims = Claims {
            user_id: 1,
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(service().verify(&token), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(service().verify("not.a.jwt"), Err(TokenError::Malformed));
        assert_eq!(service().verify("nodots"), Err(TokenError::Malformed));
    }
}
