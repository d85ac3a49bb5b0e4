//! HTTP transport layer for the Meeting BaaS SDK.

use crate::config::{ClientConfig, API_KEY_HEADER};
use crate::error::{BaasError, BaasResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// HTTP transport for making API requests.
///
/// Every request is sent exactly once; failures are returned to the caller.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> BaasResult<Self> {
        let mut headers = header::HeaderMap::new();

        // Add API key header if present
        if let Some(ref api_key) = config.api_key {
            let mut value = header::HeaderValue::from_str(api_key)
                .map_err(|_| BaasError::Config("Invalid API key format".to_string()))?;
            value.set_sensitive(true);
            headers.insert(header::HeaderName::from_static(API_KEY_HEADER), value);
        }

        let mut builder = Client::builder()
            .user_agent(concat!("baas-sdk/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Build a URL for the given path, relative to the base URL's path.
    fn build_url(&self, path: &str) -> BaasResult<url::Url> {
        Ok(self.config.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send a request once and turn non-success statuses into errors.
    async fn execute(&self, request_builder: RequestBuilder) -> BaasResult<Response> {
        let response = request_builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Request rejected by API");
        Err(BaasError::from_response(status.as_u16(), &body))
    }

    /// Decode a JSON body. An empty body decodes as JSON `null`.
    async fn decode<T: DeserializeOwned>(response: Response) -> BaasResult<T> {
        let body = response.text().await?;
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        Ok(serde_json::from_str(body)?)
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute(self.client.get(url)).await?;
        Self::decode(response).await
    }

    /// Execute a GET request with query parameters.
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request with query");

        let response = self.execute(self.client.get(url).query(query)).await?;
        Self::decode(response).await
    }

    /// Execute a POST request.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request");

        let response = self.execute(self.client.post(url).json(body)).await?;
        Self::decode(response).await
    }

    /// Execute a POST request without a request body.
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request (empty body)");

        let response = self.execute(self.client.post(url)).await?;
        Self::decode(response).await
    }

    /// Execute a POST request with query parameters.
    pub async fn post_with_query<T, Q, B>(&self, path: &str, query: &Q, body: &B) -> BaasResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request with query");

        let response = self
            .execute(self.client.post(url).query(query).json(body))
            .await?;
        Self::decode(response).await
    }

    /// Execute a POST request, ignoring the response body.
    pub async fn post_no_response<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> BaasResult<()> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request (no response)");

        self.execute(self.client.post(url).json(body)).await?;
        Ok(())
    }

    /// Execute a PATCH request.
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "PATCH request");

        let response = self.execute(self.client.patch(url).json(body)).await?;
        Self::decode(response).await
    }

    /// Execute a PATCH request with query parameters.
    pub async fn patch_with_query<T, Q, B>(&self, path: &str, query: &Q, body: &B) -> BaasResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = self.build_url(path)?;
        debug!(url = %url, "PATCH request with query");

        let response = self
            .execute(self.client.patch(url).query(query).json(body))
            .await?;
        Self::decode(response).await
    }

    /// Execute a DELETE request.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "DELETE request");

        let response = self.execute(self.client.delete(url)).await?;
        Self::decode(response).await
    }

    /// Execute a DELETE request with query parameters.
    pub async fn delete_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> BaasResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "DELETE request with query");

        let response = self.execute(self.client.delete(url).query(query)).await?;
        Self::decode(response).await
    }

    /// Execute a DELETE request without a response body.
    pub async fn delete_no_response(&self, path: &str) -> BaasResult<()> {
        let url = self.build_url(path)?;
        debug!(url = %url, "DELETE request (no response)");

        self.execute(self.client.delete(url)).await?;
        Ok(())
    }
}
