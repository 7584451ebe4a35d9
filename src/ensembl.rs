use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};

use crate::cache::QueryParams;
use crate::config::Settings;
use crate::error::ProxyError;

#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Connect(String),
    Timeout(String),
    Other(String),
}

impl TransportError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Connect(_) | TransportError::Timeout(_))
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Connect(message) => write!(f, "connection failed: {message}"),
            TransportError::Timeout(message) => write!(f, "request timed out: {message}"),
            TransportError::Other(message) => write!(f, "{message}"),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

#[async_trait]
pub trait EnsemblClient: Send + Sync {
    async fn get(&self, path: &str, params: &QueryParams)
    -> Result<UpstreamResponse, TransportError>;
}

#[async_trait]
impl<T: EnsemblClient + ?Sized> EnsemblClient for Arc<T> {
    async fn get(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<UpstreamResponse, TransportError> {
        (**self).get(path, params).await
    }
}

#[derive(Clone)]
pub struct EnsemblHttpClient {
    client: Client,
    base_url: String,
}

impl EnsemblHttpClient {
    pub fn new(settings: &Settings) -> Result<Self, ProxyError> {
        Self::with_base_url(&settings.base_url, settings.timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ProxyError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("ensembl-validator/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| ProxyError::HttpClient(err.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ProxyError::HttpClient(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl EnsemblClient for EnsemblHttpClient {
    async fn get(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<UpstreamResponse, TransportError> {
        let url = self.url(path);
        let response = self
            .client
            .get(&url)
            .query(&params.to_query())
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let client =
            EnsemblHttpClient::with_base_url("https://rest.ensembl.org/", Duration::from_secs(5))
                .unwrap();
        assert_eq!(client.url("/lookup/id/ENSG1"), "https://rest.ensembl.org/lookup/id/ENSG1");
    }

    #[test]
    fn only_connect_and_timeout_retry() {
        assert!(TransportError::Connect("refused".into()).is_retryable());
        assert!(TransportError::Timeout("read".into()).is_retryable());
        assert!(!TransportError::Other("bad header".into()).is_retryable());
    }

    #[tokio::test]
    async fn refused_connection_is_connect_error() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = EnsemblHttpClient::with_base_url(
            &format!("http://127.0.0.1:{port}"),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client
            .get("/lookup/id/ENSG1", &QueryParams::new())
            .await
            .unwrap_err();
        assert!(err.is_retryable(), "{err}");
    }
}
