use crate::domain::user::User;
use crate::logging;
use crate::routing_utils::UnauthorizedResponse;
use anyhow::{Context, anyhow};
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::header;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{Span, warn};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// ID of the user the token was issued to
    pub sub: String,
    pub email: String,
    pub name: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signing material for bearer tokens along with how long issued tokens stay valid
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl: Duration) -> TokenKeys {
        TokenKeys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let expiry = now + self.ttl;
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            iat: now.timestamp().max(0) as usize,
            exp: expiry.timestamp().max(0) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let token_data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(token_data.claims)
    }
}

/// Hashes on the blocking pool, since Argon2 holds a thread for the whole computation
pub async fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    let password = password.to_owned();

    tokio::task::spawn_blocking(move || hash_blocking(&password))
        .await
        .context("joining the password hashing task")?
}

/// False for a wrong password and for a hash that can't be parsed
pub async fn verify_password(password: &str, hash: &str) -> bool {
    let password = password.to_owned();
    let hash = hash.to_owned();

    match tokio::task::spawn_blocking(move || verify_blocking(&password, &hash)).await {
        Ok(matches) => matches,
        Err(err) => {
            warn!("Password verification task failed: {err}");
            false
        }
    }
}

fn hash_blocking(password: &str) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| anyhow!("hashing password: {err}"))?;

    Ok(hash.to_string())
}

fn verify_blocking(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// The caller, as proven by a valid `Authorization: Bearer` token. Every task route is
/// scoped to [AuthenticatedUser::user_id].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        AuthenticatedUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    TokenKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = UnauthorizedResponse;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(UnauthorizedResponse::MissingToken)?;

        let token_keys = TokenKeys::from_ref(state);
        match token_keys.verify(token) {
            Ok(claims) => {
                Span::current().record(logging::OWNER_ID_FIELD, claims.sub.as_str());
                Ok(claims.into())
            }
            Err(err) => {
                warn!("Rejected bearer token: {err}");
                Err(UnauthorizedResponse::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::test_util::user_default;
    use axum::http::Request;
    use speculoos::prelude::*;

    fn keys() -> TokenKeys {
        TokenKeys::new(b"test-secret", Duration::minutes(5))
    }

    async fn extract(authorization: Option<&str>, keys: &TokenKeys) -> Result<AuthenticatedUser, UnauthorizedResponse> {
        let mut builder = Request::builder().uri("/api/tasks");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, _) = builder
            .body(())
            .expect("request should build")
            .into_parts();

        AuthenticatedUser::from_request_parts(&mut parts, keys).await
    }

    #[tokio::test]
    async fn passwords_verify_against_their_hash() {
        let hash = hash_password("correct horse").await.expect("hashing should succeed");

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash).await);
        assert!(!verify_password("battery staple", &hash).await);
        assert!(!verify_password("correct horse", "not a phc string").await);
    }

    #[test]
    fn issued_tokens_round_trip_their_claims() {
        let keys = keys();
        let user = user_default();

        let token = keys.issue(&user).expect("token should be issued");
        let claims = keys.verify(&token).expect("token should verify");

        assert_eq!(user.id, claims.sub);
        assert_eq!(user.email, claims.email);
        assert_eq!(300, claims.exp - claims.iat);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected() {
        let token = TokenKeys::new(b"someone-else", Duration::minutes(5))
            .issue(&user_default())
            .expect("token should be issued");

        assert_that!(keys().verify(&token)).is_err();
    }

    #[tokio::test]
    async fn extracts_user_from_bearer_token() {
        let keys = keys();
        let token = keys.issue(&user_default()).expect("token should be issued");

        let extracted = extract(Some(&format!("Bearer {token}")), &keys).await;
        assert_that!(extracted)
            .is_ok()
            .matches(|user| user.user_id == "user-1" && user.name == "Someone");
    }

    #[tokio::test]
    async fn missing_or_malformed_header_is_missing_token() {
        let keys = keys();

        assert_eq!(Err(UnauthorizedResponse::MissingToken), extract(None, &keys).await);
        assert_eq!(
            Err(UnauthorizedResponse::MissingToken),
            extract(Some("Basic dXNlcjpwYXNz"), &keys).await
        );
        assert_eq!(Err(UnauthorizedResponse::MissingToken), extract(Some("Bearer "), &keys).await);
    }

    #[tokio::test]
    async fn expired_token_is_invalid() {
        let expired_keys = TokenKeys::new(b"test-secret", Duration::minutes(-10));
        let token = expired_keys
            .issue(&user_default())
            .expect("token should be issued");

        assert_eq!(
            Err(UnauthorizedResponse::InvalidToken),
            extract(Some(&format!("Bearer {token}")), &keys()).await
        );
    }
}
