//! Bearer token lifecycle.
//!
//! `NoToken --fetch--> HasToken --401 / UNAUTHORIZED--> NoToken`. Tokens are
//! never expired locally; the server's rejection is the only signal.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ClientSecret, Credentials};
use crate::constants::{OAUTH_GRANT_TYPE, OAUTH_SCOPE};
use crate::error::{AuthError, ErrorMessage, MessageCode};
use crate::observer::ApiObserver;

/// Source of bearer tokens for the request executor.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// The cached token, or a freshly fetched one if there is none.
    async fn token(&self) -> Result<String, AuthError>;

    /// Drop `rejected` from the cache. A token that already replaced it is kept.
    async fn invalidate(&self, rejected: &str);

    /// Swap the credentials used for the next fetch.
    async fn set_credentials(&self, _credentials: Credentials) {}
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
    error: Option<String>,
}

/// OAuth2 client-credentials token cache owned by one client instance.
pub struct TokenManager {
    client: Client,
    token_url: Url,
    credentials: RwLock<Credentials>,
    token: RwLock<Option<String>>,
    // Serializes fetches so concurrent callers on an empty cache share one.
    fetch: Mutex<()>,
    observer: Option<Arc<dyn ApiObserver>>,
}

impl TokenManager {
    pub fn new(client: Client, token_url: Url, credentials: Credentials) -> Self {
        Self {
            client,
            token_url,
            credentials: RwLock::new(credentials),
            token: RwLock::new(None),
            fetch: Mutex::new(()),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ApiObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn cached(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn request_token(
        &self,
        client_id: &str,
        secret: &ClientSecret,
    ) -> Result<String, AuthError> {
        if !matches!(self.token_url.scheme(), "http" | "https") {
            return Err(AuthError::InvalidUrl);
        }

        let client_secret = secret.resolve(client_id)?;
        let params = [
            ("grant_type", OAUTH_GRANT_TYPE),
            ("scope", OAUTH_SCOPE),
            ("client_id", client_id),
            ("client_secret", client_secret.as_str()),
        ];

        debug!(url = %self.token_url, "Requesting bearer token");

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Apple answers failures with a JSON body too, so parse regardless of status.
        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(%status, error = %e, "Unreadable token response");
            AuthError::ServerError
        })?;

        if let Some(code) = parsed.error {
            let code = MessageCode::from(code);
            warn!(%status, code = %code, "Token request refused");
            if let Some(observer) = &self.observer {
                observer.on_error(&ErrorMessage::new(code.clone()));
            }
            return Err(match code {
                MessageCode::InvalidClient => AuthError::InvalidClient,
                _ => AuthError::ServerError,
            });
        }

        match parsed.access_token {
            Some(token) if !token.is_empty() => {
                info!(expires_in = ?parsed.expires_in, "Obtained bearer token");
                Ok(token)
            }
            _ => Err(AuthError::ServerError),
        }
    }
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn token(&self) -> Result<String, AuthError> {
        let credentials = self.credentials.read().await.clone();
        let client_id = credentials.client_id.ok_or(AuthError::NoClientId)?;
        let secret = credentials.client_secret.ok_or(AuthError::NoClientSecret)?;

        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let _fetching = self.fetch.lock().await;
        if let Some(token) = self.cached().await {
            return Ok(token);
        }

        let token = self.request_token(&client_id, &secret).await?;
        *self.token.write().await = Some(token.clone());
        Ok(token)
    }

    async fn invalidate(&self, rejected: &str) {
        let mut token = self.token.write().await;
        if token.as_deref() == Some(rejected) {
            *token = None;
            debug!("Cleared rejected bearer token");
        }
    }

    async fn set_credentials(&self, credentials: Credentials) {
        // Waits out a fetch still running under the old credentials.
        let _fetching = self.fetch.lock().await;
        *self.credentials.write().await = credentials;
        *self.token.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::{ApiEvent, ChannelObserver};
    use wiremock::matchers::{body_string_contains, method, path};
    use std::time::Duration;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn manager(server: &MockServer, credentials: Credentials) -> TokenManager {
        let url = Url::parse(&format!("{}/auth/oauth2/token", server.uri())).unwrap();
        TokenManager::new(Client::new(), url, credentials)
    }

    fn token_body(token: &str) -> serde_json::Value {
        serde_json::json!({
            "access_token": token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "searchadsorg",
        })
    }

    #[tokio::test]
    async fn fetches_once_and_caches() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/oauth2/token"))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("scope=searchadsorg"))
            .and(body_string_contains("client_id=SEARCHADS.id"))
            .and(body_string_contains("client_secret=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc")))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = manager(&server, Credentials::new("SEARCHADS.id", "secret")).await;

        assert_eq!(tokens.token().await.unwrap(), "abc");
        assert_eq!(tokens.token().await.unwrap(), "abc");
        assert!(tokens.has_token().await);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc")))
            .expect(0)
            .mount(&server)
            .await;

        let no_id = manager(&server, Credentials::default()).await;
        assert!(matches!(no_id.token().await, Err(AuthError::NoClientId)));

        let no_secret = manager(
            &server,
            Credentials {
                client_id: Some("id".into()),
                client_secret: None,
            },
        )
        .await;
        assert!(matches!(no_secret.token().await, Err(AuthError::NoClientSecret)));
    }

    #[tokio::test]
    async fn invalid_client_is_mapped_and_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "invalid_client" })),
            )
            .mount(&server)
            .await;

        let (observer, mut events) = ChannelObserver::new();
        let tokens = manager(&server, Credentials::new("id", "secret"))
            .await
            .with_observer(Arc::new(observer));

        assert!(matches!(tokens.token().await, Err(AuthError::InvalidClient)));
        assert_eq!(
            events.try_recv().unwrap(),
            ApiEvent::Error(ErrorMessage::new(MessageCode::InvalidClient))
        );
        assert!(!tokens.has_token().await);
    }

    #[tokio::test]
    async fn unknown_token_error_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({ "error": "invalid_grant" })),
            )
            .mount(&server)
            .await;

        let tokens = manager(&server, Credentials::new("id", "secret")).await;
        assert!(matches!(tokens.token().await, Err(AuthError::ServerError)));
    }

    #[tokio::test]
    async fn malformed_response_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let tokens = manager(&server, Credentials::new("id", "secret")).await;
        assert!(matches!(tokens.token().await, Err(AuthError::ServerError)));
    }

    #[tokio::test]
    async fn invalidate_only_clears_the_rejected_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
            .mount(&server)
            .await;

        let tokens = manager(&server, Credentials::new("id", "secret")).await;
        assert_eq!(tokens.token().await.unwrap(), "fresh");

        tokens.invalidate("stale").await;
        assert!(tokens.has_token().await);

        tokens.invalidate("fresh").await;
        assert!(!tokens.has_token().await);
    }

    #[tokio::test]
    async fn new_credentials_drop_the_cached_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc")))
            .expect(2)
            .mount(&server)
            .await;

        let tokens = manager(&server, Credentials::new("id", "secret")).await;
        tokens.token().await.unwrap();

        tokens.set_credentials(Credentials::new("other", "secret")).await;
        assert!(!tokens.has_token().await);
        tokens.token().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_fetch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body("abc")))
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(manager(&server, Credentials::new("id", "secret")).await);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let tokens = tokens.clone();
                tokio::spawn(async move { tokens.token().await.unwrap() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), "abc");
        }
    }

    #[tokio::test]
    async fn non_http_token_url_is_rejected() {
        let url = Url::parse("ftp://appleid.example/auth/oauth2/token").unwrap();
        let tokens = TokenManager::new(Client::new(), url, Credentials::new("id", "secret"));

        assert!(matches!(tokens.token().await, Err(AuthError::InvalidUrl)));
        assert!(!tokens.has_token().await);
    }

    #[tokio::test]
    async fn credentials_swap_waits_for_fetch_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("client_id=old"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(token_body("old-token"))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = Arc::new(manager(&server, Credentials::new("old", "secret")).await);
        let fetching = {
            let tokens = tokens.clone();
            tokio::spawn(async move { tokens.token().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokens.set_credentials(Credentials::new("new", "secret")).await;

        assert_eq!(fetching.await.unwrap().unwrap(), "old-token");
        assert!(!tokens.has_token().await);
    }
}
