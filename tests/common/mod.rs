#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use ensembl_validator::cache::QueryParams;
use ensembl_validator::ensembl::{EnsemblClient, TransportError, UpstreamResponse};

/// Replays queued replies in order; once the queue is empty every call
/// returns the fallback.
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<UpstreamResponse, TransportError>>>,
    fallback: Result<UpstreamResponse, TransportError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, QueryParams)>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<UpstreamResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback: Err(TransportError::Other("script exhausted".to_string())),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answers 200 with `payload`.
    pub fn always(payload: Value) -> Self {
        let mut client = Self::new(Vec::new());
        client.fallback = Ok(ok(payload));
        client
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<(String, QueryParams)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl EnsemblClient for ScriptedClient {
    async fn get(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<UpstreamResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .push((path.to_string(), params.clone()));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }
}

pub fn ok(payload: Value) -> UpstreamResponse {
    UpstreamResponse {
        status: 200,
        body: payload.to_string(),
    }
}

pub fn status(status: u16, body: &str) -> UpstreamResponse {
    UpstreamResponse {
        status,
        body: body.to_string(),
    }
}

pub fn refused() -> TransportError {
    TransportError::Connect("connection refused".to_string())
}
