//! Descriptor files and the product records built from them.
//!
//! A descriptor is a short text file, one field per line:
//!
//! ```text
//! Apple
//! 500 lbs
//! Apples are crisp and sweet.
//! (optional, ignored)
//! ```
//!
//! The record's image name is derived from the descriptor's own file name, so
//! `apple.txt` always points at `apple.jpeg` whatever its fourth line says.

use crate::constants::DESCRIPTOR_REQUIRED_LINES;
use crate::error::{IngestError, Result};
use crate::scanner::FileEntry;
use serde::{Serialize, Serializer};
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Numeric weight with the unit suffix discarded.
///
/// Whole numbers serialize as JSON integers, so `"12 lbs"` uploads as `12`
/// rather than `12.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Weight(f64);

impl Weight {
    pub fn value(&self) -> f64 {
        self.0
    }

    fn as_integer(&self) -> Option<u64> {
        if self.0.fract() == 0.0 && self.0 < u64::MAX as f64 {
            Some(self.0 as u64)
        } else {
            None
        }
    }
}

impl Serialize for Weight {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self.as_integer() {
            Some(whole) => serializer.serialize_u64(whole),
            None => serializer.serialize_f64(self.0),
        }
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_integer() {
            Some(whole) => write!(f, "{}", whole),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub name: String,
    pub weight: Weight,
    pub description: String,
    #[serde(rename = "image-name")]
    pub image_name: String,
}

/// Ordered records destined for a single JSON upload.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct UploadBatch {
    records: Vec<ProductRecord>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ProductRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| IngestError::Unexpected(e.to_string()))
    }
}

impl FromIterator<ProductRecord> for UploadBatch {
    fn from_iter<I: IntoIterator<Item = ProductRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Parses descriptor files into [`ProductRecord`]s.
#[derive(Debug, Clone)]
pub struct RecordParser {
    image_extension: String,
}

impl RecordParser {
    /// `image_extension` is appended to the descriptor's base name to form
    /// the record's image name.
    pub fn new(image_extension: &str) -> Self {
        Self {
            image_extension: image_extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn parse_file(&self, entry: &FileEntry) -> Result<ProductRecord> {
        let content = read_descriptor(&entry.path)?;
        self.parse_str(&entry.base_name, &content)
            .map_err(|reason| IngestError::schema(&entry.path, reason))
    }

    /// Builds a record from descriptor text. The error is a bare reason; the
    /// caller attaches the path.
    pub fn parse_str(&self, base_name: &str, content: &str) -> std::result::Result<ProductRecord, String> {
        let lines: Vec<&str> = content.lines().map(str::trim).collect();
        if lines.len() < DESCRIPTOR_REQUIRED_LINES {
            return Err(format!(
                "expected at least {} lines, found {}",
                DESCRIPTOR_REQUIRED_LINES,
                lines.len()
            ));
        }

        let name = lines[0].trim_start_matches('\u{feff}');
        if name.is_empty() {
            return Err("name line is empty".to_string());
        }
        let weight = parse_weight(lines[1])?;
        let description = lines[2];
        if description.is_empty() {
            return Err("description line is empty".to_string());
        }

        Ok(ProductRecord {
            name: name.to_string(),
            weight,
            description: description.to_string(),
            image_name: format!("{}.{}", base_name, self.image_extension),
        })
    }
}

/// Reads the leading whitespace-delimited number of a weight line; the unit
/// that follows is dropped, not converted.
pub fn parse_weight(line: &str) -> std::result::Result<Weight, String> {
    let token = line
        .split_whitespace()
        .next()
        .ok_or_else(|| "weight line is empty".to_string())?;

    let value: f64 = token
        .parse()
        .map_err(|_| format!("weight {:?} is not a number", token))?;

    if !value.is_finite() || value < 0.0 {
        return Err(format!("weight {:?} is not a non-negative number", token));
    }

    Ok(Weight(value))
}

fn read_descriptor(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => IngestError::schema(path, "content is not valid UTF-8"),
        _ => IngestError::io(path, e),
    })
}
