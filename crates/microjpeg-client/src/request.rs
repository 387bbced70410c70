//! Request bodies for the MicroJPEG operations.
//!
//! Uploads become a multipart form with a `file` part plus one text part per
//! option that is set. A remote URL is only accepted by compression and is sent
//! as a JSON document instead. Bodies are transport-neutral; the transport
//! decides how to put them on the wire.

use std::path::PathBuf;

use bytes::Bytes;
use microjpeg_core::{
    content_type_for, BackgroundRemovalOptions, CompressOptions, EnhanceOptions,
};
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{ClientError, ClientResult};

/// Where the image to process comes from.
pub enum InputSource<'a> {
    /// Local file, opened and read by the client.
    FilePath(PathBuf),
    /// In-memory image data.
    Bytes { data: Bytes, file_name: String },
    /// Caller-owned reader. It is read to the end but never closed.
    Stream {
        reader: &'a mut (dyn AsyncRead + Unpin + Send),
        file_name: String,
    },
    /// Image the service fetches itself (compression only).
    RemoteUrl(String),
}

impl<'a> InputSource<'a> {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        InputSource::FilePath(path.into())
    }

    pub fn bytes(data: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        InputSource::Bytes {
            data: data.into(),
            file_name: file_name.into(),
        }
    }

    pub fn stream(
        reader: &'a mut (dyn AsyncRead + Unpin + Send),
        file_name: impl Into<String>,
    ) -> Self {
        InputSource::Stream {
            reader,
            file_name: file_name.into(),
        }
    }

    pub fn url(url: impl Into<String>) -> Self {
        InputSource::RemoteUrl(url.into())
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, InputSource::RemoteUrl(_))
    }
}

impl std::fmt::Debug for InputSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputSource::FilePath(path) => f.debug_tuple("FilePath").field(path).finish(),
            InputSource::Bytes { data, file_name } => f
                .debug_struct("Bytes")
                .field("file_name", file_name)
                .field("len", &data.len())
                .finish(),
            InputSource::Stream { file_name, .. } => f
                .debug_struct("Stream")
                .field("file_name", file_name)
                .finish_non_exhaustive(),
            InputSource::RemoteUrl(url) => f.debug_tuple("RemoteUrl").field(url).finish(),
        }
    }
}

/// The `file` part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Bytes,
}

impl FilePart {
    pub fn new(data: impl Into<Bytes>, file_name: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            content_type: content_type_for(&file_name),
            file_name,
            data: data.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartForm {
    pub file: FilePart,
    /// Text parts in send order.
    pub fields: Vec<(&'static str, String)>,
}

impl MultipartForm {
    pub fn new(file: FilePart) -> Self {
        Self {
            file,
            fields: Vec::new(),
        }
    }

    pub fn text(mut self, name: &'static str, value: impl ToString) -> Self {
        self.fields.push((name, value.to_string()));
        self
    }

    /// Add a text part only when `value` is set.
    pub fn optional<V: ToString>(self, name: &'static str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.text(name, v),
            None => self,
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|(n, _)| *n).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Multipart(MultipartForm),
    Json(serde_json::Value),
}

impl RequestBody {
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::Multipart(_) => "multipart",
            RequestBody::Json(_) => "json",
        }
    }
}

/// JSON body of URL-based compression. Unset options are omitted, not null.
#[derive(Debug, Serialize)]
struct UrlCompressRequest<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quality: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<&'static str>,
}

pub fn compress_form(file: FilePart, options: &CompressOptions) -> MultipartForm {
    MultipartForm::new(file)
        .optional("quality", options.quality)
        .optional("format", options.format())
        .optional("width", options.resize_width)
        .optional("height", options.resize_height)
        .optional("mode", options.resize_mode.map(|m| m.as_str()))
}

pub fn background_removal_form(file: FilePart, options: &BackgroundRemovalOptions) -> MultipartForm {
    MultipartForm::new(file)
        .optional("quality", options.quality)
        .optional("format", options.format())
}

pub fn enhance_form(file: FilePart, options: &EnhanceOptions) -> MultipartForm {
    MultipartForm::new(file)
        .text("scale", options.scale.factor())
        .text("face_enhance", options.face_enhance)
        .optional("quality", options.quality)
        .optional("format", options.format())
}

pub fn compress_url_body(url: &str, options: &CompressOptions) -> ClientResult<serde_json::Value> {
    let request = UrlCompressRequest {
        url,
        quality: options.quality,
        format: options.format(),
        width: options.resize_width,
        height: options.resize_height,
        mode: options.resize_mode.map(|m| m.as_str()),
    };
    Ok(serde_json::to_value(request)?)
}

/// Body for `compress`: JSON for a remote URL, multipart otherwise.
pub async fn build_compress(
    source: InputSource<'_>,
    options: &CompressOptions,
) -> ClientResult<RequestBody> {
    match source {
        InputSource::RemoteUrl(url) => Ok(RequestBody::Json(compress_url_body(&url, options)?)),
        other => {
            let file = read_file_part(other).await?;
            Ok(RequestBody::Multipart(compress_form(file, options)))
        }
    }
}

pub async fn build_background_removal(
    source: InputSource<'_>,
    options: &BackgroundRemovalOptions,
) -> ClientResult<RequestBody> {
    let file = read_file_part(source).await?;
    Ok(RequestBody::Multipart(background_removal_form(file, options)))
}

pub async fn build_enhance(
    source: InputSource<'_>,
    options: &EnhanceOptions,
) -> ClientResult<RequestBody> {
    let file = read_file_part(source).await?;
    Ok(RequestBody::Multipart(enhance_form(file, options)))
}

/// Read an upload source into the `file` part.
///
/// A file opened from a path is dropped, and therefore closed, before this
/// returns, whether reading succeeded or not.
pub async fn read_file_part(source: InputSource<'_>) -> ClientResult<FilePart> {
    match source {
        InputSource::FilePath(path) => {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    ClientError::InvalidArgument(format!(
                        "Path has no file name: {}",
                        path.display()
                    ))
                })?;
            let mut file = tokio::fs::File::open(&path).await?;
            read_stream_part(&mut file, file_name).await
        }
        InputSource::Bytes { data, file_name } => Ok(FilePart::new(data, file_name)),
        InputSource::Stream { reader, file_name } => read_stream_part(reader, file_name).await,
        InputSource::RemoteUrl(url) => Err(ClientError::InvalidArgument(format!(
            "URL input is only supported for compression: {}",
            url
        ))),
    }
}

async fn read_stream_part<R>(reader: &mut R, file_name: String) -> ClientResult<FilePart>
where
    R: AsyncRead + Unpin + Send + ?Sized,
{
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer).await?;
    Ok(FilePart::new(buffer, file_name))
}
