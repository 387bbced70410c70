//! Domain methods for the MicroJPEG API client.
//!
//! Each operation accepts any [`InputSource`]; the `*_file`, `*_bytes` and
//! `*_stream` variants are shorthands for the matching source.

use std::path::Path;

use bytes::Bytes;
use microjpeg_core::{
    BackgroundRemovalOptions, CompressOptions, CompressionInfo, DownloadReference,
    EnhanceOptions, EnhancementInfo, ResultEnvelope, UsageInfo,
};
use tokio::io::AsyncRead;

use crate::artifact;
use crate::error::ClientResult;
use crate::request::{self, InputSource};
use crate::transport::ByteStream;
use crate::ApiClient;

pub const COMPRESS_ENDPOINT: &str = "compress";
pub const REMOVE_BACKGROUND_ENDPOINT: &str = "remove-background";
pub const ENHANCE_ENDPOINT: &str = "enhance";
pub const USAGE_ENDPOINT: &str = "usage";

type Upload<'a> = &'a mut (dyn AsyncRead + Unpin + Send);

impl ApiClient {
    /// Compress an image. A `RemoteUrl` source is sent as JSON; all other
    /// sources are uploaded as multipart.
    pub async fn compress(
        &self,
        input: InputSource<'_>,
        options: Option<&CompressOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        let default = CompressOptions::default();
        let body = request::build_compress(input, options.unwrap_or(&default)).await?;
        self.send(COMPRESS_ENDPOINT, body).await
    }

    pub async fn compress_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<&CompressOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.compress(InputSource::file(path.as_ref()), options).await
    }

    pub async fn compress_bytes(
        &self,
        data: impl Into<Bytes>,
        file_name: &str,
        options: Option<&CompressOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.compress(InputSource::bytes(data, file_name), options)
            .await
    }

    pub async fn compress_stream(
        &self,
        reader: Upload<'_>,
        file_name: &str,
        options: Option<&CompressOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.compress(InputSource::stream(reader, file_name), options)
            .await
    }

    /// Let the service fetch and compress a remote image.
    pub async fn compress_url(
        &self,
        url: &str,
        options: Option<&CompressOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.compress(InputSource::url(url), options).await
    }

    /// Convert to another format: compression with only format and quality set.
    pub async fn convert(
        &self,
        input: InputSource<'_>,
        format: &str,
        quality: Option<u32>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        let options = CompressOptions::conversion(format, quality);
        self.compress(input, Some(&options)).await
    }

    pub async fn convert_file(
        &self,
        path: impl AsRef<Path>,
        format: &str,
        quality: Option<u32>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.convert(InputSource::file(path.as_ref()), format, quality)
            .await
    }

    pub async fn convert_bytes(
        &self,
        data: impl Into<Bytes>,
        file_name: &str,
        format: &str,
        quality: Option<u32>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.convert(InputSource::bytes(data, file_name), format, quality)
            .await
    }

    pub async fn convert_stream(
        &self,
        reader: Upload<'_>,
        file_name: &str,
        format: &str,
        quality: Option<u32>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.convert(InputSource::stream(reader, file_name), format, quality)
            .await
    }

    /// Remove the background of an uploaded image. URL sources are rejected.
    pub async fn remove_background(
        &self,
        input: InputSource<'_>,
        options: Option<&BackgroundRemovalOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        let default = BackgroundRemovalOptions::default();
        let body = request::build_background_removal(input, options.unwrap_or(&default)).await?;
        self.send(REMOVE_BACKGROUND_ENDPOINT, body).await
    }

    pub async fn remove_background_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<&BackgroundRemovalOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.remove_background(InputSource::file(path.as_ref()), options)
            .await
    }

    pub async fn remove_background_bytes(
        &self,
        data: impl Into<Bytes>,
        file_name: &str,
        options: Option<&BackgroundRemovalOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.remove_background(InputSource::bytes(data, file_name), options)
            .await
    }

    pub async fn remove_background_stream(
        &self,
        reader: Upload<'_>,
        file_name: &str,
        options: Option<&BackgroundRemovalOptions>,
    ) -> ClientResult<ResultEnvelope<CompressionInfo>> {
        self.remove_background(InputSource::stream(reader, file_name), options)
            .await
    }

    /// AI upscaling. `scale` and `face_enhance` are always sent, defaulting to
    /// 2 and false.
    pub async fn enhance(
        &self,
        input: InputSource<'_>,
        options: Option<&EnhanceOptions>,
    ) -> ClientResult<ResultEnvelope<EnhancementInfo>> {
        let default = EnhanceOptions::default();
        let body = request::build_enhance(input, options.unwrap_or(&default)).await?;
        self.send(ENHANCE_ENDPOINT, body).await
    }

    pub async fn enhance_file(
        &self,
        path: impl AsRef<Path>,
        options: Option<&EnhanceOptions>,
    ) -> ClientResult<ResultEnvelope<EnhancementInfo>> {
        self.enhance(InputSource::file(path.as_ref()), options).await
    }

    pub async fn enhance_bytes(
        &self,
        data: impl Into<Bytes>,
        file_name: &str,
        options: Option<&EnhanceOptions>,
    ) -> ClientResult<ResultEnvelope<EnhancementInfo>> {
        self.enhance(InputSource::bytes(data, file_name), options)
            .await
    }

    pub async fn enhance_stream(
        &self,
        reader: Upload<'_>,
        file_name: &str,
        options: Option<&EnhanceOptions>,
    ) -> ClientResult<ResultEnvelope<EnhancementInfo>> {
        self.enhance(InputSource::stream(reader, file_name), options)
            .await
    }

    /// Account tier, usage and limits.
    pub async fn get_usage(&self) -> ClientResult<UsageInfo> {
        self.get(USAGE_ENDPOINT).await
    }

    /// Download the artifact behind `reference` into memory.
    pub async fn download<R>(&self, reference: &R) -> ClientResult<Bytes>
    where
        R: DownloadReference + ?Sized,
    {
        artifact::fetch_bytes(self.transport(), reference.download_url()).await
    }

    /// Open the artifact behind `reference` as a stream owned by the caller.
    pub async fn download_stream<R>(&self, reference: &R) -> ClientResult<ByteStream>
    where
        R: DownloadReference + ?Sized,
    {
        artifact::fetch_stream(self.transport(), reference.download_url()).await
    }

    /// Stream the artifact behind `reference` to `output_path`.
    pub async fn save_to_file<R>(
        &self,
        reference: &R,
        output_path: impl AsRef<Path>,
    ) -> ClientResult<u64>
    where
        R: DownloadReference + ?Sized,
    {
        artifact::fetch_to_file(self.transport(), reference.download_url(), output_path).await
    }
}
