use crate::errors::{AppError, AppResult};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const TOKEN_LIFETIME_SECS: i64 = 3600;
/// Tokens are renewed this long before they expire.
const REFRESH_MARGIN_SECS: i64 = 300;

/// Fields of a service account JSON key that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: String,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: i64,
}

/// OAuth2 bearer tokens for a service account, cached until shortly before expiry.
pub(crate) struct ServiceAccount {
    key: ServiceAccountKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccount {
    /// Reads a service account key file.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the file is missing or is not a service account key.
    pub(crate) fn from_file(client: reqwest::Client, path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            AppError::AuthError(format!("Failed to read {}: {e}", path.display()))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&contents).map_err(|e| {
            AppError::AuthError(format!("Invalid service account key {}: {e}", path.display()))
        })?;
        Ok(Self {
            key,
            client,
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, exchanging a fresh signed assertion when the
    /// cached one is about to expire.
    pub(crate) async fn access_token(&self) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp();
        if let Some(token) = self.cached_token(now) {
            return Ok(token);
        }

        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::AuthError(format!(
                "Token exchange failed with HTTP {status}: {body}"
            )));
        }
        let token: TokenResponse = response.json().await?;

        let expires_at = now + token.expires_in.unwrap_or(TOKEN_LIFETIME_SECS);
        debug!(
            client_email = %self.key.client_email,
            expires_at = expires_at,
            "Access token issued"
        );
        *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }

    fn cached_token(&self, now: i64) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .filter(|token| token.expires_at - REFRESH_MARGIN_SECS > now)
            .map(|token| token.value.clone())
    }

    fn signed_assertion(&self, now: i64) -> AppResult<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SCOPES,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}
