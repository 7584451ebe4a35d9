use std::time::Duration;

use serde_json::Value;

use crate::cache::{QueryParams, RequestFingerprint, ResponseCache};
use crate::config::Settings;
use crate::ensembl::{EnsemblClient, TransportError};
use crate::error::ProxyError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    // Total attempts, not additional retries.
    pub attempts: u32,
    pub backoff_base: Duration,
}

impl RetryPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_base: Duration::from_millis(200),
        }
    }
}

pub struct Fetcher<C: EnsemblClient> {
    client: C,
    cache: ResponseCache,
    policy: RetryPolicy,
    ttl: Duration,
}

impl<C: EnsemblClient> Fetcher<C> {
    pub fn new(client: C, policy: RetryPolicy, ttl: Duration) -> Self {
        Self {
            client,
            cache: ResponseCache::new(),
            policy,
            ttl,
        }
    }

    pub fn from_settings(client: C, settings: &Settings) -> Self {
        let policy = RetryPolicy {
            attempts: settings.retries,
            backoff_base: settings.backoff_base,
        };
        Self::new(client, policy, settings.cache_ttl)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub async fn fetch(&self, path: &str, params: &QueryParams) -> Result<Value, ProxyError> {
        let key = RequestFingerprint::compute(path, params);
        if let Some(payload) = self.cache.get(&key) {
            tracing::debug!(fingerprint = %key, path, "cache hit");
            return Ok(payload);
        }
        tracing::debug!(fingerprint = %key, path, "cache miss");

        let mut last_failure: Option<TransportError> = None;
        for attempt in 1..=self.policy.attempts {
            match self.client.get(path, params).await {
                Ok(response) if response.status >= 400 => {
                    tracing::warn!(path, status = response.status, attempt, "upstream returned error status");
                    return Err(ProxyError::upstream(response.status, response.body));
                }
                Ok(response) => {
                    let payload: Value = serde_json::from_str(&response.body).map_err(|err| {
                        ProxyError::upstream(502, format!("Upstream returned invalid JSON: {err}"))
                    })?;
                    self.cache.insert(key, payload.clone(), self.ttl);
                    return Ok(payload);
                }
                Err(err) if err.is_retryable() => {
                    tracing::warn!(path, attempt, error = %err, "upstream request failed");
                    last_failure = Some(err);
                    if attempt < self.policy.attempts {
                        tokio::time::sleep(self.policy.delay(attempt)).await;
                    }
                }
                Err(err) => {
                    return Err(ProxyError::upstream(502, format!("Upstream error: {err}")));
                }
            }
        }

        match last_failure {
            Some(err) => Err(ProxyError::upstream(502, format!("Upstream error: {err}"))),
            None => Err(ProxyError::upstream(502, "Unknown upstream error")),
        }
    }
}
