use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::{header, request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::sync::Arc;

/// Claims carried by bearer tokens issued to einvoice users.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies HS256 bearer tokens against the shared secret.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &Secret<String>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::Unauthorized(anyhow::anyhow!("Invalid or expired token"))
            })
    }
}

/// Authenticated user, taken from `Authorization: Bearer <token>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub i32);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    Arc<TokenVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Unauthorized(anyhow::anyhow!("Missing or invalid authorization header"))
        })?;

        let claims = verifier.verify(token)?;
        tracing::Span::current().record("user_id", claims.user_id);

        Ok(CurrentUser(claims.user_id))
    }
}

/// Like [`CurrentUser`], but also accepts `?token=` so that plain browser
/// downloads can authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadUser(pub i32);

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for DownloadUser
where
    S: Send + Sync,
    Arc<TokenVerifier>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if bearer_token(parts).is_some() {
            let CurrentUser(user_id) = CurrentUser::from_request_parts(parts, state).await?;
            return Ok(DownloadUser(user_id));
        }

        let token = Query::<TokenQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Authentication required")))?;

        let verifier = Arc::<TokenVerifier>::from_ref(state);
        let claims = verifier.verify(&token)?;
        Ok(DownloadUser(claims.user_id))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
