//! MicroJPEG Core Library
//!
//! Domain models, operation options, the API error type, client configuration
//! and the upload content-type resolver shared by the client and CLI crates.

pub mod config;
pub mod error;
pub mod mime;
pub mod models;

// Re-export commonly used types
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ApiError, ConfigError};
pub use mime::content_type_for;
pub use models::{
    BackgroundRemovalOptions, CompressOptions, CompressionInfo, Dimensions, DownloadReference,
    EnhanceOptions, EnhanceScale, EnhancementInfo, ResizeMode, ResultEnvelope, UsageInfo,
    UsageLimits, UsageStats,
};
