//! I/O helpers for the demo tool.
//!
//! - `load_image`: read a PNG/JPEG into an owned gray or RGB buffer.
//! - `load_mask`: read an opacity mask as 8-bit gray.
//! - `save_grayscale_u8`: write an owned 8-bit gray buffer (e.g. an edge mask).
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{GrayImageU8, ImageRgb8, ImageU8, SourceImage};
use image::{DynamicImage, GrayImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Owned decoded raster, kept in the colour layout it was stored with.
#[derive(Clone, Debug)]
pub enum LoadedImage {
    Gray {
        width: usize,
        height: usize,
        data: Vec<u8>,
    },
    Rgb {
        width: usize,
        height: usize,
        data: Vec<u8>,
    },
}

impl LoadedImage {
    pub fn width(&self) -> usize {
        match self {
            LoadedImage::Gray { width, .. } | LoadedImage::Rgb { width, .. } => *width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            LoadedImage::Gray { height, .. } | LoadedImage::Rgb { height, .. } => *height,
        }
    }

    /// Borrow as a detector input.
    pub fn as_source(&self) -> SourceImage<'_> {
        match self {
            LoadedImage::Gray {
                width,
                height,
                data,
            } => SourceImage::Gray(ImageU8::packed(*width, *height, data)),
            LoadedImage::Rgb {
                width,
                height,
                data,
            } => SourceImage::Rgb(ImageRgb8::packed(*width, *height, data)),
        }
    }
}

/// Load an image from disk, keeping grayscale files single channel.
pub fn load_image(path: &Path) -> Result<LoadedImage, String> {
    let img = image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(match img {
        DynamicImage::ImageLuma8(gray) => LoadedImage::Gray {
            width,
            height,
            data: gray.into_raw(),
        },
        other => LoadedImage::Rgb {
            width,
            height,
            data: other.into_rgb8().into_raw(),
        },
    })
}

/// Load an opacity mask (any format) as 8-bit gray.
pub fn load_mask(path: &Path) -> Result<GrayImageU8, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open mask {}: {e}", path.display()))?
        .into_luma8();
    let width = img.width() as usize;
    let height = img.height() as usize;
    Ok(GrayImageU8::new(width, height, img.into_raw()))
}

/// Save an 8-bit grayscale buffer to a PNG.
pub fn save_grayscale_u8(buffer: &GrayImageU8, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let view = buffer.as_view();
    let image = GrayImage::from_raw(view.w as u32, view.h as u32, buffer.data().to_vec())
        .ok_or_else(|| "Failed to create image buffer".to_string())?;
    DynamicImage::ImageLuma8(image)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
