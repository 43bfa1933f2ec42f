use std::sync::Arc;

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::{TokenManager, TokenProvider};
use crate::config::{Config, Credentials};
use crate::constants::{
    ACLS_ENDPOINT, AUTHORIZATION_HEADER, CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON, CONTEXT_HEADER,
    MAX_AUTH_RETRIES,
};
use crate::error::{ApiError, ErrorMessage, MessageCode};
use crate::observer::ApiObserver;
use crate::reporting::Pagination;

/// Placeholder body type for calls that send nothing.
pub const NO_BODY: Option<&()> = None;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetail {
    pub total_results: u32,
    pub start_index: u32,
    pub items_per_page: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    errors: Option<Vec<ErrorMessage>>,
}

/// `{data, error, pagination}` wrapper around every response.
#[derive(Debug, Deserialize)]
struct ResponseEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    error: Option<ErrorEnvelope>,
    #[serde(default)]
    pagination: Option<PageDetail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Option<T>,
    pub pagination: Option<PageDetail>,
}

enum Attempt<T> {
    Done(Page<T>),
    TokenRejected,
}

pub struct SearchAdsApi {
    client: Client,
    api_url: Url,
    auth: Arc<dyn TokenProvider>,
    org_id: RwLock<Option<i64>>,
    observer: Option<Arc<dyn ApiObserver>>,
}

impl SearchAdsApi {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> SearchAdsApiBuilder {
        SearchAdsApiBuilder {
            config,
            token_provider: None,
            observer: None,
        }
    }

    pub async fn org_id(&self) -> Option<i64> {
        *self.org_id.read().await
    }

    pub async fn set_org_id(&self, org_id: Option<i64>) {
        *self.org_id.write().await = org_id;
    }

    pub async fn set_credentials(&self, credentials: Credentials) {
        self.auth.set_credentials(credentials).await;
    }

    /// Sends one API call and unwraps the envelope's `data`.
    pub async fn request<T, B>(
        &self,
        method: Method,
        api: &str,
        org_id: Option<i64>,
        page: Option<Pagination>,
        body: Option<&B>,
    ) -> Result<Option<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        Ok(self
            .request_page(method, api, org_id, page, body)
            .await?
            .data)
    }

    /// Like [`request`](Self::request) but keeps the envelope's pagination block.
    ///
    /// A rejected token (HTTP 401 or an `UNAUTHORIZED` message code) is
    /// dropped and the call replayed with a fresh one, at most
    /// `MAX_AUTH_RETRIES` times.
    #[instrument(skip_all, fields(method = %method, api = %api))]
    pub async fn request_page<T, B>(
        &self,
        method: Method,
        api: &str,
        org_id: Option<i64>,
        page: Option<Pagination>,
        body: Option<&B>,
    ) -> Result<Page<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        if org_id.is_none() && api != ACLS_ENDPOINT {
            return Err(ApiError::NoOrgId);
        }

        let url = self.endpoint(api, page)?;
        let body = body
            .map(|body| serde_json::to_vec(body))
            .transpose()
            .map_err(ApiError::Encode)?;

        for attempt in 0..=MAX_AUTH_RETRIES {
            let token = self.auth.token().await?;
            match self
                .send(&method, &url, &token, org_id, body.as_deref())
                .await?
            {
                Attempt::Done(page) => {
                    if let Some(observer) = &self.observer {
                        observer.on_response();
                    }
                    return Ok(page);
                }
                Attempt::TokenRejected => {
                    warn!(attempt, "Bearer token rejected");
                    self.auth.invalidate(&token).await;
                }
            }
        }

        Err(ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
        })
    }

    fn endpoint(&self, api: &str, page: Option<Pagination>) -> Result<Url, ApiError> {
        let mut url = self
            .api_url
            .join(api)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if let Some(page) = page {
            url.query_pairs_mut()
                .append_pair("limit", &page.limit.to_string())
                .append_pair("offset", &page.offset.to_string());
        }
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &Url,
        token: &str,
        org_id: Option<i64>,
        body: Option<&[u8]>,
    ) -> Result<Attempt<T>, ApiError> {
        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION_HEADER, format!("Bearer {}", token));
        if let Some(org_id) = org_id {
            request = request.header(CONTEXT_HEADER, format!("orgId={}", org_id));
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE_HEADER, CONTENT_TYPE_JSON)
                .body(body.to_vec());
        }

        debug!(%url, ?org_id, body_len = body.map(<[u8]>::len), "Sending request");

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Attempt::TokenRejected);
        }
        if status != StatusCode::OK {
            warn!(%status, %url, "Request failed");
            return Err(ApiError::Server { status });
        }

        let bytes = response.bytes().await?;
        let envelope: ResponseEnvelope<T> =
            serde_json::from_slice(&bytes).map_err(ApiError::Decode)?;

        let first_error = envelope
            .error
            .and_then(|e| e.errors)
            .and_then(|errors| errors.into_iter().next());
        if let Some(error) = first_error {
            if error.message_code == MessageCode::Unauthorized {
                return Ok(Attempt::TokenRejected);
            }
            warn!(
                code = %error.message_code,
                field = ?error.field,
                message = ?error.message,
                "API returned an error"
            );
            if let Some(observer) = &self.observer {
                observer.on_error(&error);
            }
            return Err(ApiError::Api(error));
        }

        Ok(Attempt::Done(Page {
            data: envelope.data,
            pagination: envelope.pagination,
        }))
    }
}

pub struct SearchAdsApiBuilder {
    config: Config,
    token_provider: Option<Arc<dyn TokenProvider>>,
    observer: Option<Arc<dyn ApiObserver>>,
}

impl SearchAdsApiBuilder {
    /// Replaces the built-in [`TokenManager`]; the configured credentials are then unused.
    pub fn token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ApiObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> Result<SearchAdsApi, ApiError> {
        let client = Client::builder().build()?;
        let Config {
            credentials,
            org_id,
            api_url,
            token_url,
        } = self.config;

        let auth = match self.token_provider {
            Some(provider) => provider,
            None => {
                let manager = TokenManager::new(client.clone(), token_url, credentials);
                let manager = match &self.observer {
                    Some(observer) => manager.with_observer(observer.clone()),
                    None => manager,
                };
                Arc::new(manager)
            }
        };

        Ok(SearchAdsApi {
            client,
            api_url,
            auth,
            org_id: RwLock::new(org_id),
            observer: self.observer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> ResponseEnvelope<Vec<i64>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_data_decodes_as_none() {
        let envelope = decode(json!({ "pagination": { "totalResults": 0, "startIndex": 0, "itemsPerPage": 0 } }));
        assert!(envelope.data.is_none());
        assert_eq!(envelope.pagination.map(|p| p.total_results), Some(0));
    }

    #[test]
    fn null_error_list_is_no_error() {
        let envelope = decode(json!({ "data": [1, 2], "error": { "errors": null } }));
        assert_eq!(envelope.data, Some(vec![1, 2]));
        assert!(envelope.error.and_then(|e| e.errors).is_none());

        let envelope = decode(json!({ "data": [], "error": null }));
        assert!(envelope.error.is_none());
    }
}
