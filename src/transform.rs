use crate::config::PipelineConfig;
use crate::constants::DEFAULT_PNG_PRESET;
use crate::error::{IngestError, Result};
use crate::formats::{OutputFormat, ResampleFilter};
use crate::scanner::FileEntry;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Maximum source file size in bytes (100MB)
const MAX_SOURCE_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// A converted image held in memory until it is written next to its source.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub color_mode: ColorType,
    pub encoded_bytes: Vec<u8>,
}

/// Resizes, flattens to RGB and re-encodes source images.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    width: u32,
    height: u32,
    filter: ResampleFilter,
    format: OutputFormat,
    quality: u8,
}

impl ImageTransformer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            width: config.target_width,
            height: config.target_height,
            filter: config.resample_filter,
            format: config.output_format,
            quality: config.quality,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format
    }

    /// Same directory and base name as the source, with the output extension.
    pub fn output_path_for(&self, entry: &FileEntry) -> PathBuf {
        entry.path.with_file_name(format!(
            "{}.{}",
            entry.base_name,
            self.format.extension()
        ))
    }

    /// Transform and write; nothing is written when either step fails.
    pub fn convert(&self, entry: &FileEntry) -> Result<ImageAsset> {
        let asset = self.transform(entry)?;
        self.write(&asset)?;
        Ok(asset)
    }

    /// Decode, resize to the target dimensions, drop alpha and encode in memory.
    pub fn transform(&self, entry: &FileEntry) -> Result<ImageAsset> {
        let img = load_image(&entry.path)?;
        debug!(
            path = ?entry.path,
            width = img.width(),
            height = img.height(),
            color = ?img.color(),
            "Decoded source image"
        );

        let img = self.resize_and_flatten(&img);
        let encoded_bytes = self.encode(&img, &entry.path)?;

        Ok(ImageAsset {
            source_path: entry.path.clone(),
            output_path: self.output_path_for(entry),
            pixel_width: img.width(),
            pixel_height: img.height(),
            color_mode: img.color(),
            encoded_bytes,
        })
    }

    pub fn resize_and_flatten(&self, img: &DynamicImage) -> DynamicImage {
        let resized = if img.dimensions() == (self.width, self.height) {
            img.clone()
        } else {
            img.resize_exact(self.width, self.height, self.filter.to_filter_type())
        };
        DynamicImage::ImageRgb8(resized.to_rgb8())
    }

    fn encode(&self, img: &DynamicImage, source: &Path) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();

        match self.format {
            OutputFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
                img.write_with_encoder(encoder)
            }
            OutputFormat::Png | OutputFormat::WebP => {
                img.write_to(&mut Cursor::new(&mut buffer), self.format.to_image_format())
            }
        }
        .map_err(|e| IngestError::encode(source, e))?;

        if self.format == OutputFormat::Png {
            // Recompress only; output stays 8-bit RGB.
            let mut options = oxipng::Options::from_preset(DEFAULT_PNG_PRESET);
            options.bit_depth_reduction = false;
            options.color_type_reduction = false;
            options.palette_reduction = false;
            options.grayscale_reduction = false;
            buffer = oxipng::optimize_from_memory(&buffer, &options)
                .map_err(|e| IngestError::encode(source, e))?;
        }

        Ok(buffer)
    }

    /// Writes through a temporary file in the target directory and renames it
    /// into place, so a reader never sees a half-written output.
    pub fn write(&self, asset: &ImageAsset) -> Result<PathBuf> {
        let dir = asset
            .output_path
            .parent()
            .ok_or_else(|| IngestError::encode(&asset.source_path, "output has no parent directory"))?;

        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| IngestError::encode(&asset.source_path, e))?;
        temp.write_all(&asset.encoded_bytes)
            .map_err(|e| IngestError::encode(&asset.source_path, e))?;
        temp.persist(&asset.output_path)
            .map_err(|e| IngestError::encode(&asset.source_path, e.error))?;

        Ok(asset.output_path.clone())
    }
}

/// Opens and decodes an image, sniffing the content rather than trusting the
/// extension. Empty, truncated and non-image files all come back as
/// [`IngestError::Decode`].
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let file_size = fs::metadata(path)
        .map_err(|e| IngestError::decode(path, e))?
        .len();
    if file_size == 0 {
        return Err(IngestError::decode(path, "file is empty"));
    }
    if file_size > MAX_SOURCE_FILE_SIZE {
        return Err(IngestError::decode(
            path,
            format!(
                "file too large: {} bytes, maximum {} bytes",
                file_size, MAX_SOURCE_FILE_SIZE
            ),
        ));
    }

    ImageReader::open(path)
        .map_err(|e| IngestError::decode(path, e))?
        .with_guessed_format()
        .map_err(|e| IngestError::decode(path, e))?
        .decode()
        .map_err(|e| IngestError::decode(path, e))
}
