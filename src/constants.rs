pub const DEFAULT_IMAGES_DIR: &str = "~/supplier-data/images";
pub const DEFAULT_DESCRIPTIONS_DIR: &str = "~/supplier-data/descriptions";

pub const DEFAULT_IMAGE_EXTENSION: &str = "tif";
pub const DEFAULT_TEXT_EXTENSION: &str = "txt";

pub const DEFAULT_TARGET_WIDTH: u32 = 600;
pub const DEFAULT_TARGET_HEIGHT: u32 = 400;
pub const MAX_TARGET_DIMENSION: u32 = 16384;

// Pillow's default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 75;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

pub const DEFAULT_PNG_PRESET: u8 = 2;

pub const DEFAULT_IMAGES_ENDPOINT: &str = "http://localhost/upload/";
pub const DEFAULT_DESCRIPTIONS_ENDPOINT: &str = "http://localhost/fruits/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Multipart form field carrying the image bytes.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Minimum number of descriptor lines that carry data (name, weight, description).
pub const DESCRIPTOR_REQUIRED_LINES: usize = 3;

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Summary prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const INFO_PREFIX: &str = "📋";
