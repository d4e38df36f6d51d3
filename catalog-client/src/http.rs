//! HTTP client for network-based API calls

use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::ApiResponse;

use crate::{ClientConfig, ClientError, ClientResult};

/// HTTP client for making requests to the catalog service.
///
/// Authentication rides on the session cookie held in the client's jar.
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
}

impl NetworkHttpClient {
    /// Create a new HTTP client from configuration
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            let url: Url = base_url
                .parse()
                .map_err(|e| ClientError::Config(format!("invalid base url {base_url}: {e}")))?;
            jar.add_cookie_str(cookie, &url);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .cookie_provider(jar)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.get(self.url(path))).await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    /// Make a POST request with JSON body
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    /// Make a POST request with a multipart form body
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.post(self.url(path)).multipart(form)).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<ApiResponse<T>> {
        self.send(self.client.delete(self.url(path))).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<ApiResponse<T>> {
        let response = request.send().await?;
        tracing::debug!(url = %response.url(), status = %response.status(), "catalog response");
        Self::handle_response(response).await
    }

    /// Handle the HTTP response.
    ///
    /// The service wraps failures in the same envelope as successes, so the
    /// body is decoded before the status decides anything except 401.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<ApiResponse<T>>(&body) {
            Ok(envelope) if status.is_success() && envelope.success => Ok(envelope),
            Ok(envelope) => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: envelope.message().map(str::to_string),
            }),
            Err(_) if !status.is_success() => Err(ClientError::Rejected {
                status: status.as_u16(),
                message: None,
            }),
            Err(e) => Err(ClientError::InvalidResponse(e.to_string())),
        }
    }
}
