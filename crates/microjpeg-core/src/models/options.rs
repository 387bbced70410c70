use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// How the service fits an image into the requested width/height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeMode {
    Fit,
    Cover,
    ScaleWidth,
    ScaleHeight,
    Thumb,
}

impl ResizeMode {
    /// Wire value: the lowercased variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeMode::Fit => "fit",
            ResizeMode::Cover => "cover",
            ResizeMode::ScaleWidth => "scalewidth",
            ResizeMode::ScaleHeight => "scaleheight",
            ResizeMode::Thumb => "thumb",
        }
    }
}

impl FromStr for ResizeMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fit" => Ok(ResizeMode::Fit),
            "cover" => Ok(ResizeMode::Cover),
            "scalewidth" => Ok(ResizeMode::ScaleWidth),
            "scaleheight" => Ok(ResizeMode::ScaleHeight),
            "thumb" => Ok(ResizeMode::Thumb),
            _ => Err(anyhow::anyhow!("Invalid resize mode: {}", s)),
        }
    }
}

impl Display for ResizeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Upscaling factor for AI enhancement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhanceScale {
    #[default]
    X2,
    X4,
    X8,
}

impl EnhanceScale {
    pub fn factor(&self) -> u8 {
        match self {
            EnhanceScale::X2 => 2,
            EnhanceScale::X4 => 4,
            EnhanceScale::X8 => 8,
        }
    }
}

impl FromStr for EnhanceScale {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_suffix('x')
            .or_else(|| trimmed.strip_suffix('X'))
            .unwrap_or(trimmed);
        match digits {
            "2" => Ok(EnhanceScale::X2),
            "4" => Ok(EnhanceScale::X4),
            "8" => Ok(EnhanceScale::X8),
            _ => Err(anyhow::anyhow!(
                "Invalid enhance scale: {} (expected 2, 4 or 8)",
                s
            )),
        }
    }
}

impl Display for EnhanceScale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.factor())
    }
}

/// Options for `compress` (and `convert`, which only sets format and quality).
///
/// Every field is optional; unset fields are left out of the request so the
/// service applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressOptions {
    pub quality: Option<u32>,
    pub output_format: Option<String>,
    pub resize_width: Option<u32>,
    pub resize_height: Option<u32>,
    pub resize_mode: Option<ResizeMode>,
}

impl CompressOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quality(mut self, quality: u32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    pub fn resize(mut self, width: Option<u32>, height: Option<u32>) -> Self {
        self.resize_width = width;
        self.resize_height = height;
        self
    }

    pub fn resize_mode(mut self, mode: ResizeMode) -> Self {
        self.resize_mode = Some(mode);
        self
    }

    /// Options equivalent to a format conversion.
    pub fn conversion(format: impl Into<String>, quality: Option<u32>) -> Self {
        Self {
            quality,
            output_format: Some(format.into()),
            ..Self::default()
        }
    }

    /// Output format, treating an empty string as unset.
    pub fn format(&self) -> Option<&str> {
        non_empty(self.output_format.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackgroundRemovalOptions {
    pub output_format: Option<String>,
    pub quality: Option<u32>,
}

impl BackgroundRemovalOptions {
    pub fn format(&self) -> Option<&str> {
        non_empty(self.output_format.as_deref())
    }
}

/// Options for AI enhancement. `scale` and `face_enhance` are always sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnhanceOptions {
    pub scale: EnhanceScale,
    pub face_enhance: bool,
    pub output_format: Option<String>,
    pub quality: Option<u32>,
}

impl EnhanceOptions {
    pub fn format(&self) -> Option<&str> {
        non_empty(self.output_format.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
