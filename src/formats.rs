/// Output encodings and resampling filters
///
/// Type-safe replacements for the string options accepted on the command line
/// and in the configuration file.
use crate::error::{IngestError, Result};
use image::imageops::FilterType;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported output image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG with configurable quality
    #[default]
    Jpeg,
    /// PNG, optimized with oxipng
    Png,
    /// Lossless WebP
    WebP,
}

impl OutputFormat {
    /// File extension written for this format, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::WebP => "image/webp",
        }
    }

    pub fn to_image_format(&self) -> ImageFormat {
        match self {
            OutputFormat::Jpeg => ImageFormat::Jpeg,
            OutputFormat::Png => ImageFormat::Png,
            OutputFormat::WebP => ImageFormat::WebP,
        }
    }

    /// Guess the format of an already converted file from its extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim_start_matches('.').to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(OutputFormat::Jpeg),
            "png" => Some(OutputFormat::Png),
            "webp" => Some(OutputFormat::WebP),
            _ => None,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Png => "PNG",
            OutputFormat::WebP => "WebP",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for OutputFormat {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        OutputFormat::from_extension(s)
            .ok_or_else(|| IngestError::InvalidConfig(format!("unsupported output format: {}", s)))
    }
}

/// Resampling filter used for every resize in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn to_filter_type(&self) -> FilterType {
        match self {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl FromStr for ResampleFilter {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "triangle" | "bilinear" => Ok(ResampleFilter::Triangle),
            "catmull-rom" | "bicubic" => Ok(ResampleFilter::CatmullRom),
            "gaussian" => Ok(ResampleFilter::Gaussian),
            "lanczos3" | "lanczos" => Ok(ResampleFilter::Lanczos3),
            _ => Err(IngestError::InvalidConfig(format!(
                "unsupported resample filter: {}",
                s
            ))),
        }
    }
}
