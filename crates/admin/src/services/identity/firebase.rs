//! Firebase Identity Toolkit REST client.
//!
//! # API Reference
//!
//! - Base URL: `https://identitytoolkit.googleapis.com/v1`
//! - Authentication: web API key via the `key` query parameter
//! - Errors: `{"error": {"code": 400, "message": "INVALID_PASSWORD"}}`

use std::sync::Arc;

use folio_core::{AuthErrorKind, Email};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use super::{AuthProviderError, IdentityProvider, ProviderSession};
use crate::config::IdentityConfig;

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Identity Toolkit client.
#[derive(Clone)]
pub struct FirebaseAuthClient {
    inner: Arc<FirebaseAuthClientInner>,
}

struct FirebaseAuthClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

impl FirebaseAuthClient {
    /// Create a new Identity Toolkit client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &IdentityConfig) -> Result<Self, AuthProviderError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AuthProviderError::Http(e.without_url()))?;

        Ok(Self {
            inner: Arc::new(FirebaseAuthClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Build `{base}/accounts:{method}?key=...`.
    fn endpoint(&self, method: &str) -> Result<url::Url, AuthProviderError> {
        let mut url = url::Url::parse(&format!("{}/accounts:{method}", self.inner.base_url))
            .map_err(|e| AuthProviderError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.inner.api_key.expose_secret());
        Ok(url)
    }

    /// POST a JSON body to an `accounts:` method.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, AuthProviderError> {
        let url = self.endpoint(method)?;
        // The URL carries the API key, so strip it from transport errors.
        let response = self
            .inner
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AuthProviderError::Http(e.without_url()))?;

        self.handle_response(response).await
    }

    /// Handle API response and parse JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AuthProviderError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AuthProviderError::Http(e.without_url()))?;

        if status.is_success() {
            return serde_json::from_str(&text)
                .map_err(|e| AuthProviderError::Parse(format!("Failed to parse response: {e}")));
        }

        Err(parse_error(status.as_u16(), &text))
    }
}

/// Classify an error response body.
fn parse_error(status: u16, body: &str) -> AuthProviderError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            AuthProviderError::Rejected(AuthErrorKind::from_provider_code(&envelope.error.message))
        }
        _ if status == 429 => AuthProviderError::Rejected(AuthErrorKind::TooManyRequests),
        _ => AuthProviderError::Parse(format!("unexpected {status} response")),
    }
}

impl IdentityProvider for FirebaseAuthClient {
    #[tracing::instrument(skip(self, password), fields(email = %email))]
    async fn sign_in(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<ProviderSession, AuthProviderError> {
        let body = json!({
            "email": email.as_str(),
            "password": password.expose_secret(),
            "returnSecureToken": true,
        });
        let response: SignInResponse = self.post("signInWithPassword", &body).await?;

        Ok(ProviderSession {
            uid: response.local_id,
            email: response.email,
            id_token: SecretString::from(response.id_token),
            refresh_token: SecretString::from(response.refresh_token),
        })
    }

    #[tracing::instrument(skip(self), fields(email = %email))]
    async fn send_password_reset(&self, email: &Email) -> Result<(), AuthProviderError> {
        let body = json!({
            "requestType": "PASSWORD_RESET",
            "email": email.as_str(),
        });
        let _: serde_json::Value = self.post("sendOobCode", &body).await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn update_password(
        &self,
        id_token: &SecretString,
        new_password: &SecretString,
    ) -> Result<(), AuthProviderError> {
        let body = json!({
            "idToken": id_token.expose_secret(),
            "password": new_password.expose_secret(),
            "returnSecureToken": false,
        });
        let _: serde_json::Value = self.post("update", &body).await?;
        Ok(())
    }
}

impl std::fmt::Debug for FirebaseAuthClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuthClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> FirebaseAuthClient {
        FirebaseAuthClient::new(&IdentityConfig {
            api_key: SecretString::from("AIzaSyTestKey"),
            base_url: "http://localhost:9099/identitytoolkit.googleapis.com/v1".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn endpoint_appends_method_and_key() {
        let url = client().endpoint("signInWithPassword").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signInWithPassword?key=AIzaSyTestKey"
        );
    }

    #[test]
    fn error_body_is_classified() {
        let body = r#"{"error":{"code":400,"message":"INVALID_PASSWORD","errors":[]}}"#;
        assert_eq!(parse_error(400, body).kind(), AuthErrorKind::WrongPassword);

        let body = r#"{"error":{"code":400,"message":"TOO_MANY_ATTEMPTS_TRY_LATER : Access disabled"}}"#;
        assert_eq!(parse_error(400, body).kind(), AuthErrorKind::TooManyRequests);
    }

    #[test]
    fn unreadable_error_bodies() {
        assert_eq!(
            parse_error(429, "<html>").kind(),
            AuthErrorKind::TooManyRequests
        );
        assert!(matches!(
            parse_error(502, "bad gateway"),
            AuthProviderError::Parse(_)
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let output = format!("{:?}", client());
        assert!(!output.contains("AIzaSyTestKey"));
    }

    #[test]
    fn sign_in_response_uses_camel_case() {
        let parsed: SignInResponse = serde_json::from_str(
            r#"{"localId":"uid-1","email":"a@b.com","idToken":"t","refreshToken":"r","expiresIn":"3600"}"#,
        )
        .unwrap();
        assert_eq!(parsed.local_id, "uid-1");
        assert_eq!(parsed.email, "a@b.com");
    }
}
