//! HTTP transport abstraction
//!
//! The client speaks to the API through the `Transport` trait so the protocol
//! layer (auth, status handling, decoding) is independent of the HTTP stack.
//! `ReqwestTransport` is the production implementation.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio_util::io::StreamReader;

use crate::error::TransportError;
use crate::request::{MultipartForm, RequestBody};

/// Single-use byte stream of a downloaded artifact. The holder owns it.
pub type ByteStream = Pin<Box<dyn AsyncRead + Send>>;

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method: Method::POST,
            url: url.into(),
            headers: HeaderMap::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Status, headers and the fully read body of a response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Send-request / fetch-artifact capability consumed by `ApiClient`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an API request and return the response whatever its status.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Plain GET of an artifact URL. Non-2xx answers are errors.
    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, TransportError>;

    /// Plain GET of an artifact URL, buffered.
    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, TransportError> {
        let mut stream = self.fetch_stream(url).await?;
        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await?;
        Ok(Bytes::from(buffer))
    }
}

/// `Transport` backed by a `reqwest::Client`.
///
/// API calls are bounded by a total deadline. Artifact downloads are only
/// bounded per connect and per read, so a large body that keeps arriving is
/// never cut short.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    request_timeout: Option<Duration>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            request_timeout: Some(timeout),
        })
    }

    /// Wrap an existing client, sharing its connection pool. Its own timeout
    /// settings apply unchanged.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            request_timeout: None,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    async fn get_checked(&self, url: &str) -> Result<reqwest::Response, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }
        Ok(response)
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
    let MultipartForm { file, fields } = form;
    let length = file.data.len() as u64;
    let part = reqwest::multipart::Part::stream_with_length(file.data, length)
        .file_name(file.file_name)
        .mime_str(file.content_type)
        .map_err(|e| TransportError::Body(format!("Invalid content type: {}", e)))?;

    let mut reqwest_form = reqwest::multipart::Form::new().part("file", part);
    for (name, value) in fields {
        reqwest_form = reqwest_form.text(name, value);
    }
    Ok(reqwest_form)
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers);

        builder = match request.body {
            Some(RequestBody::Multipart(form)) => builder.multipart(to_reqwest_form(form)?),
            Some(RequestBody::Json(value)) => builder.json(&value),
            None => builder,
        };
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }

    async fn fetch_stream(&self, url: &str) -> Result<ByteStream, TransportError> {
        let response = self.get_checked(url).await?;
        let stream = response.bytes_stream().map_err(std::io::Error::other);
        Ok(Box::pin(StreamReader::new(stream)))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Bytes, TransportError> {
        let response = self.get_checked(url).await?;
        Ok(response.bytes().await?)
    }
}
