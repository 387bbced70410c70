use serde::{Deserialize, Serialize};

/// Success wrapper returned by every mutating operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEnvelope<T> {
    pub success: bool,
    pub result: T,
    /// Operations used on the account after this call.
    pub compression_count: u64,
}

/// Payload of compress, convert and remove-background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionInfo {
    pub download_url: String,
    pub original_size: u64,
    pub compressed_size: u64,
    pub savings_percent: f64,
    /// Milliseconds spent by the service.
    pub processing_time: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Payload of enhance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancementInfo {
    pub download_url: String,
    pub original_dimensions: Dimensions,
    pub new_dimensions: Dimensions,
    pub processing_time: u64,
}

/// A payload pointing at a processed artifact.
///
/// The URL is opaque: it is handed to the transport as-is.
pub trait DownloadReference {
    fn download_url(&self) -> &str;
}

impl DownloadReference for CompressionInfo {
    fn download_url(&self) -> &str {
        &self.download_url
    }
}

impl DownloadReference for EnhancementInfo {
    fn download_url(&self) -> &str {
        &self.download_url
    }
}

impl<T: DownloadReference> DownloadReference for ResultEnvelope<T> {
    fn download_url(&self) -> &str {
        self.result.download_url()
    }
}

impl DownloadReference for str {
    fn download_url(&self) -> &str {
        self
    }
}

impl DownloadReference for String {
    fn download_url(&self) -> &str {
        self
    }
}
