use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::UserStore;

/// Scheme prefix accepted (case-sensitively) in front of a raw token.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Lifetime of every issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Represents the claims encoded within a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: Uuid,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiration, seconds since epoch.
    pub exp: i64,
}

/// Why a presented credential was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No `Authorization` header, or an empty one.
    #[error("Token is missing")]
    MissingToken,
    /// Malformed token or signature mismatch.
    #[error("Token is invalid")]
    InvalidToken,
    /// Signature fine, but `exp` has passed.
    #[error("Token has expired")]
    ExpiredToken,
    /// Valid token for a user that no longer exists.
    #[error("User not found")]
    UserNotFound,
}

impl From<AuthFailure> for AppError {
    fn from(failure: AuthFailure) -> Self {
        AppError::Unauthenticated(failure)
    }
}

/// Mints session tokens signed with the process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Issues a token for `user_id`, valid for 24 hours from now.
    pub fn issue(&self, user_id: Uuid) -> Result<String, AppError> {
        self.issue_at(user_id, Utc::now())
    }

    /// Issues a token as if minted at `issued_at`.
    pub fn issue_at(&self, user_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.key)?)
    }
}

/// Validates presented tokens and resolves them to a live user id.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
    users: Arc<dyn UserStore>,
}

impl TokenVerifier {
    pub fn new(secret: &str, users: Arc<dyn UserStore>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            users,
        }
    }

    /// Checks signature and expiry only. Does not touch the store.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthFailure> {
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthFailure::ExpiredToken,
                _ => AuthFailure::InvalidToken,
            })?;

        // jsonwebtoken accepts `exp == now`; a token is only valid strictly before exp.
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthFailure::ExpiredToken);
        }
        Ok(claims)
    }

    /// Verifies a raw header value (with or without the `Bearer ` prefix) and
    /// returns the id of the user it belongs to.
    ///
    /// Auth rejections come back as `AppError::Unauthenticated`; a store failure
    /// while resolving the user is an `AppError::Internal`.
    pub async fn verify(&self, raw: &str) -> Result<Uuid, AppError> {
        let token = raw.strip_prefix(BEARER_PREFIX).unwrap_or(raw).trim();
        if token.is_empty() {
            return Err(AuthFailure::InvalidToken.into());
        }

        let claims = self.decode(token)?;
        match self.users.find_by_id(claims.sub).await? {
            Some(user) => Ok(user.id),
            None => Err(AuthFailure::UserNotFound.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::store::MemoryStore;

    const SECRET: &str = "test_secret_for_tokens";

    async fn setup() -> (TokenIssuer, TokenVerifier, Uuid) {
        let store = Arc::new(MemoryStore::default());
        let user = User::new("t@example.com".into(), "hash".into(), "T".into());
        store.insert(&user).await.unwrap();
        (
            TokenIssuer::new(SECRET),
            TokenVerifier::new(SECRET, store),
            user.id,
        )
    }

    fn expect_failure(result: Result<Uuid, AppError>, expected: AuthFailure) {
        match result {
            Err(AppError::Unauthenticated(failure)) => assert_eq!(failure, expected),
            other => panic!("expected {:?}, got {:?}", expected, other),
        }
    }

    #[actix_rt::test]
    async fn test_token_generation_and_verification() {
        let (issuer, verifier, user_id) = setup().await;
        let token = issuer.issue(user_id).unwrap();

        assert_eq!(verifier.verify(&token).await.unwrap(), user_id);
        assert_eq!(
            verifier.verify(&format!("Bearer {}", token)).await.unwrap(),
            user_id
        );

        let claims = verifier.decode(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_HOURS * 3600);
    }

    #[actix_rt::test]
    async fn test_token_expiration() {
        let (issuer, verifier, user_id) = setup().await;

        let stale = issuer
            .issue_at(user_id, Utc::now() - Duration::hours(TOKEN_TTL_HOURS) - Duration::seconds(1))
            .unwrap();
        expect_failure(verifier.verify(&stale).await, AuthFailure::ExpiredToken);

        let fresh = issuer
            .issue_at(user_id, Utc::now() - Duration::hours(TOKEN_TTL_HOURS) + Duration::minutes(1))
            .unwrap();
        assert_eq!(verifier.verify(&fresh).await.unwrap(), user_id);
    }

    #[actix_rt::test]
    async fn test_invalid_token_signature() {
        let (_, verifier, user_id) = setup().await;
        let forged = TokenIssuer::new("a_completely_different_secret")
            .issue(user_id)
            .unwrap();

        expect_failure(verifier.verify(&forged).await, AuthFailure::InvalidToken);
    }

    #[actix_rt::test]
    async fn test_any_mutated_byte_is_rejected() {
        let (issuer, verifier, user_id) = setup().await;
        let token = issuer.issue(user_id).unwrap();

        for (i, original) in token.char_indices() {
            let replacement = if original == 'A' { 'B' } else { 'A' };
            let mut mutated = token.clone();
            mutated.replace_range(i..i + 1, &replacement.to_string());
            assert!(
                verifier.decode(&mutated).is_err(),
                "mutation at byte {} was accepted",
                i
            );
        }
    }

    #[actix_rt::test]
    async fn test_unknown_user_and_empty_token() {
        let (issuer, verifier, _) = setup().await;
        let orphan = issuer.issue(Uuid::new_v4()).unwrap();

        expect_failure(verifier.verify(&orphan).await, AuthFailure::UserNotFound);
        expect_failure(verifier.verify("Bearer ").await, AuthFailure::InvalidToken);
        expect_failure(verifier.verify("not.a.token").await, AuthFailure::InvalidToken);
    }

    #[actix_rt::test]
    async fn test_scheme_prefix_is_case_sensitive() {
        let (issuer, verifier, user_id) = setup().await;
        let token = issuer.issue(user_id).unwrap();

        expect_failure(
            verifier.verify(&format!("bearer {}", token)).await,
            AuthFailure::InvalidToken,
        );
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(AuthFailure::MissingToken.to_string(), "Token is missing");
        assert_eq!(AuthFailure::InvalidToken.to_string(), "Token is invalid");
        assert_eq!(AuthFailure::ExpiredToken.to_string(), "Token has expired");
        assert_eq!(AuthFailure::UserNotFound.to_string(), "User not found");
    }
}
