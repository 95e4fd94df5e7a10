use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::{AdminSettings, DEFAULT_ADMIN_PASSWORD};

const ADMIN_SUBJECT: &str = "admin";

/// Errors that can occur when unlocking or checking admin access
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect password")]
    InvalidPassword,

    #[error("Missing admin token")]
    MissingToken,

    #[error("Invalid admin token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Admin session has been locked")]
    Revoked,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// An unlocked admin session
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Password gate for the admin controls
///
/// A correct password yields a signed, expiring token. Locking a session puts
/// its id on a revocation list that lives as long as the token could.
pub struct AdminAuth {
    password: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
    revoked: moka::future::Cache<String, ()>,
}

impl AdminAuth {
    pub fn new(password: &str, secret: Option<&str>, ttl_secs: u64) -> Self {
        let secret = match secret.filter(|s| !s.is_empty()) {
            Some(secret) => secret.to_string(),
            // Tokens then die with the process, which only forces a re-unlock.
            None => format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple()),
        };

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ADMIN_SUBJECT.to_string());

        let ttl = Duration::from_secs(ttl_secs.max(1));

        Self {
            password: password.to_string(),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
            revoked: moka::future::Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn from_settings(settings: &AdminSettings) -> Self {
        Self::new(
            &settings.password,
            settings.token_secret.as_deref(),
            settings.session_ttl_secs,
        )
    }

    /// Whether the shipped placeholder password is still in use
    pub fn uses_default_password(&self) -> bool {
        self.password == DEFAULT_ADMIN_PASSWORD
    }

    /// Check the password and open a session
    pub fn unlock(&self, attempt: &str) -> Result<AdminSession, AuthError> {
        if !constant_time_eq(attempt.as_bytes(), self.password.as_bytes()) {
            tracing::warn!("Rejected admin unlock attempt");
            return Err(AuthError::InvalidPassword);
        }

        let now = Utc::now();
        let expires_at = now + chrono::Duration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        tracing::info!(session_id = %claims.jti, "Admin mode unlocked");

        Ok(AdminSession {
            session_id: claims.jti,
            token,
            expires_at,
        })
    }

    /// Validate a bearer token
    pub fn verify(&self, token: &str) -> Result<AdminSession, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)?;
        if self.revoked.contains_key(&data.claims.jti) {
            return Err(AuthError::Revoked);
        }

        Ok(AdminSession {
            session_id: data.claims.jti,
            token: token.to_string(),
            expires_at: DateTime::from_timestamp(data.claims.exp, 0).unwrap_or_else(Utc::now),
        })
    }

    /// Lock a session so its token is no longer accepted
    pub async fn lock(&self, session: &AdminSession) {
        self.revoked.insert(session.session_id.clone(), ()).await;
        tracing::info!(session_id = %session.session_id, "Admin mode locked");
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
