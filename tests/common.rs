#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};
use supplier_ingest::{PipelineConfig, UploadConfig};
use tempfile::TempDir;

pub fn create_temp_directory() -> TempDir {
    TempDir::new().unwrap()
}

/// Writes a small RGBA TIFF, so conversion has an alpha channel to drop.
pub fn create_tiff(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbaImage::from_pixel(width, height, Rgba([10, 120, 200, 255]))
        .save_with_format(&path, ImageFormat::Tiff)
        .unwrap();
    path
}

pub fn create_descriptor(dir: &Path, base_name: &str, name: &str, weight: &str) -> PathBuf {
    let path = dir.join(format!("{}.txt", base_name));
    fs::write(
        &path,
        format!("{}\n{}\nA fine {}.\n{}.jpeg\n", name, weight, name, base_name),
    )
    .unwrap();
    path
}

pub fn create_nested_directory_structure(root: &Path) -> PathBuf {
    let nested = root.join("batch-1").join("crate-a");
    fs::create_dir_all(&nested).unwrap();
    nested
}

pub fn test_config(root: &Path, server_url: &str) -> PipelineConfig {
    PipelineConfig {
        images_dir: root.join("images"),
        descriptions_dir: root.join("descriptions"),
        target_width: 60,
        target_height: 40,
        upload: UploadConfig {
            images_endpoint: format!("{}/upload/", server_url),
            descriptions_endpoint: format!("{}/fruits/", server_url),
            timeout_secs: 5,
        },
        ..PipelineConfig::default()
    }
}

pub fn create_input_dirs(root: &Path) -> (PathBuf, PathBuf) {
    let images = root.join("images");
    let descriptions = root.join("descriptions");
    fs::create_dir_all(&images).unwrap();
    fs::create_dir_all(&descriptions).unwrap();
    (images, descriptions)
}
