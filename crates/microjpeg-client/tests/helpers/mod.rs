//! Test helpers: an in-memory `Transport` that replays canned responses and
//! records every request it receives.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use microjpeg_client::{
    ByteStream, ClientConfig, HttpRequest, HttpResponse, Transport, TransportError,
};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_BASE_URL: &str = "https://api.test.local/v1";

#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    assets: Mutex<HashMap<String, Bytes>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: StatusCode, body: impl Into<Bytes>) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    pub fn respond_json(&self, status: StatusCode, body: serde_json::Value) -> &Self {
        self.respond(status, body.to_string())
    }

    pub fn asset(&self, url: &str, data: impl Into<Bytes>) -> &Self {
        self.assets
            .lock()
            .unwrap()
            .insert(url.to_string(), data.into());
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no canned response left");
        Ok(response)
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, TransportError> {
        let data = self.assets.lock().unwrap().get(url).cloned();
        match data {
            Some(data) => Ok(Box::pin(std::io::Cursor::new(data.to_vec()))),
            None => Err(TransportError::Status {
                status: StatusCode::NOT_FOUND,
                url: url.to_string(),
            }),
        }
    }
}

/// Transport that flips a flag when it is dropped.
pub struct DropTrackingTransport {
    pub inner: MockTransport,
    pub dropped: Arc<AtomicBool>,
}

impl Drop for DropTrackingTransport {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Transport for DropTrackingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.inner.send(request).await
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, TransportError> {
        self.inner.fetch_stream(url).await
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new(TEST_API_KEY).with_base_url(TEST_BASE_URL)
}

pub fn compression_success(count: u64) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "result": {
            "downloadUrl": "https://x/y.jpg",
            "originalSize": 1000,
            "compressedSize": 400,
            "savingsPercent": 60,
            "processingTime": 120
        },
        "compressionCount": count
    })
}

pub fn enhancement_success(count: u64) -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "result": {
            "downloadUrl": "https://x/enhanced.png",
            "originalDimensions": {"width": 100, "height": 50},
            "newDimensions": {"width": 200, "height": 100},
            "processingTime": 900
        },
        "compressionCount": count
    })
}
