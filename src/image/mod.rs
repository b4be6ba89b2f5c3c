//! Raster views used by the pipeline.
//!
//! Callers hand in borrowed 8-bit buffers (`ImageU8`, `ImageRgb8`); numeric
//! stages work on the owned `ImageF32`, and masks travel as `GrayImageU8`.
pub mod f32;
pub mod io;
pub mod rgb;
pub mod traits;
pub mod u8;

pub use self::f32::ImageF32;
pub use self::rgb::ImageRgb8;
pub use self::traits::{ImageView, ImageViewMut};
pub use self::u8::{GrayImageU8, ImageU8};

/// Decoded source raster handed to the detector.
#[derive(Clone, Copy, Debug)]
pub enum SourceImage<'a> {
    Gray(ImageU8<'a>),
    Rgb(ImageRgb8<'a>),
}

impl<'a> SourceImage<'a> {
    pub fn width(&self) -> usize {
        match self {
            SourceImage::Gray(img) => img.w,
            SourceImage::Rgb(img) => img.w,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            SourceImage::Gray(img) => img.h,
            SourceImage::Rgb(img) => img.h,
        }
    }

    pub fn is_well_formed(&self) -> bool {
        match self {
            SourceImage::Gray(img) => img.is_well_formed(),
            SourceImage::Rgb(img) => img.is_well_formed(),
        }
    }

    /// Grayscale float copy in `[0, 255]`.
    pub fn to_gray_f32(&self) -> ImageF32 {
        match self {
            SourceImage::Gray(img) => ImageF32::from_gray(img),
            SourceImage::Rgb(img) => img.to_gray_f32(),
        }
    }
}

impl<'a> From<ImageU8<'a>> for SourceImage<'a> {
    fn from(img: ImageU8<'a>) -> Self {
        SourceImage::Gray(img)
    }
}

impl<'a> From<ImageRgb8<'a>> for SourceImage<'a> {
    fn from(img: ImageRgb8<'a>) -> Self {
        SourceImage::Rgb(img)
    }
}
