//! Async HTTP client for the MicroJPEG API.
//!
//! `ApiClient` owns the credentials and the base endpoint, sends requests built
//! by [`request`] through a [`Transport`], and normalizes every answer into
//! either a typed value or an [`ApiError`]. Domain methods (compress, convert,
//! remove background, enhance, usage, downloads) live in [`api`].

pub mod api;
pub mod artifact;
pub mod error;
pub mod request;
pub mod transport;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use http::header::AUTHORIZATION;
use http::HeaderValue;
use serde::de::DeserializeOwned;

use microjpeg_core::config::normalize_base_url;
pub use microjpeg_core::{
    ApiError, BackgroundRemovalOptions, ClientConfig, CompressOptions, CompressionInfo,
    Dimensions, DownloadReference, EnhanceOptions, EnhanceScale, EnhancementInfo, ResizeMode,
    ResultEnvelope, UsageInfo, UsageLimits, UsageStats,
};

pub use error::{ClientError, ClientResult, TransportError};
pub use request::{InputSource, RequestBody};
pub use transport::{ByteStream, HttpRequest, HttpResponse, ReqwestTransport, Transport};

/// How the client holds its transport.
///
/// A transport the client built itself is owned and released together with the
/// client. A caller-supplied transport is shared: dropping the client only
/// drops this reference.
enum TransportHandle {
    Owned(Box<dyn Transport>),
    Shared(Arc<dyn Transport>),
}

impl TransportHandle {
    fn get(&self) -> &dyn Transport {
        match self {
            TransportHandle::Owned(transport) => transport.as_ref(),
            TransportHandle::Shared(transport) => transport.as_ref(),
        }
    }
}

/// HTTP client for the MicroJPEG API.
pub struct ApiClient {
    transport: TransportHandle,
    base_url: String,
    authorization: HeaderValue,
    compression_count: AtomicU64,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("owns_transport", &self.owns_transport())
            .field("compression_count", &self.compression_count())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Client with default settings and its own reqwest transport.
    pub fn new(api_key: impl Into<String>) -> ClientResult<Self> {
        Self::from_config(ClientConfig::new(api_key))
    }

    pub fn from_config(config: ClientConfig) -> ClientResult<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Self::build(config, TransportHandle::Owned(Box::new(transport)))
    }

    /// Create client from environment: MICROJPEG_API_KEY (or API_KEY),
    /// MICROJPEG_API_URL (or API_URL), MICROJPEG_TIMEOUT_SECS.
    pub fn from_env() -> ClientResult<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    /// Client over a caller-supplied transport. The client never tears it down.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> ClientResult<Self> {
        Self::build(config, TransportHandle::Shared(transport))
    }

    /// Client that takes ownership of `transport` and releases it on drop.
    pub fn with_owned_transport(
        config: ClientConfig,
        transport: Box<dyn Transport>,
    ) -> ClientResult<Self> {
        Self::build(config, TransportHandle::Owned(transport))
    }

    fn build(config: ClientConfig, transport: TransportHandle) -> ClientResult<Self> {
        let ClientConfig {
            api_key, base_url, ..
        } = config;

        if api_key.trim().is_empty() {
            return Err(ClientError::InvalidArgument(
                "API key must not be empty".to_string(),
            ));
        }

        let mut client = Self {
            transport,
            base_url: String::new(),
            authorization: basic_auth_header(&api_key)?,
            compression_count: AtomicU64::new(0),
        };
        client.set_base_url(&base_url)?;
        Ok(client)
    }

    /// Point the client at another endpoint (staging, a local mock, ...).
    pub fn with_base_url(mut self, base_url: &str) -> ClientResult<Self> {
        self.set_base_url(base_url)?;
        Ok(self)
    }

    fn set_base_url(&mut self, base_url: &str) -> ClientResult<()> {
        let base_url = normalize_base_url(base_url.trim());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidArgument(format!(
                "Base URL must be an http(s) URL: {}",
                base_url
            )));
        }
        self.base_url = base_url;
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    /// Compression count reported by the most recent successful mutating call.
    ///
    /// Concurrent calls overwrite it in completion order; the envelope returned
    /// by each call is the authoritative value for that call.
    pub fn compression_count(&self) -> u64 {
        self.compression_count.load(Ordering::Relaxed)
    }

    /// Whether the transport was created by (and is released with) this client.
    pub fn owns_transport(&self) -> bool {
        matches!(self.transport, TransportHandle::Owned(_))
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.get()
    }

    /// POST a mutating operation and decode its envelope.
    ///
    /// Records the envelope's `compressionCount` on success.
    pub async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: RequestBody,
    ) -> ClientResult<ResultEnvelope<T>> {
        let start = Instant::now();
        tracing::debug!(endpoint = %endpoint, body = body.kind(), "Sending MicroJPEG request");

        let request = HttpRequest::post(self.build_url(endpoint), body)
            .header(AUTHORIZATION, self.authorization.clone());
        let response = self.transport().send(request).await?;
        let envelope: ResultEnvelope<T> = decode_response(response)?;

        self.compression_count
            .store(envelope.compression_count, Ordering::Relaxed);

        tracing::info!(
            endpoint = %endpoint,
            compression_count = envelope.compression_count,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "MicroJPEG request successful"
        );

        Ok(envelope)
    }

    /// GET a read-only endpoint. Does not touch the compression count.
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ClientResult<T> {
        tracing::debug!(endpoint = %endpoint, "Sending MicroJPEG query");

        let request =
            HttpRequest::get(self.build_url(endpoint)).header(AUTHORIZATION, self.authorization.clone());
        let response = self.transport().send(request).await?;
        decode_response(response)
    }
}

/// `Basic base64("api:" + key)`, marked sensitive so it is never printed.
fn basic_auth_header(api_key: &str) -> ClientResult<HeaderValue> {
    let encoded = BASE64.encode(format!("api:{}", api_key));
    let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
        .map_err(|e| ClientError::InvalidArgument(format!("Invalid API key: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// 2xx: decode the body as `T`. Otherwise: normalize into `ApiError`.
fn decode_response<T: DeserializeOwned>(response: HttpResponse) -> ClientResult<T> {
    if !response.status.is_success() {
        return Err(ApiError::from_response(response.status.as_u16(), &response.body).into());
    }
    Ok(serde_json::from_slice(&response.body)?)
}
