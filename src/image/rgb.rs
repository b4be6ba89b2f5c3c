//! Interleaved 8-bit RGB view and its grayscale conversion.
use super::f32::ImageF32;
use super::traits::ImageViewMut;

/// Luminance weights used when collapsing RGB to gray.
const LUMA_WEIGHTS: [f32; 3] = [0.3, 0.59, 0.11];

/// Borrowed interleaved RGB view; `stride` counts pixels, not bytes.
#[derive(Clone, Copy, Debug)]
pub struct ImageRgb8<'a> {
    pub w: usize,
    pub h: usize,
    pub stride: usize,
    pub data: &'a [u8],
}

impl<'a> ImageRgb8<'a> {
    pub fn packed(w: usize, h: usize, data: &'a [u8]) -> Self {
        Self {
            w,
            h,
            stride: w,
            data,
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> [u8; 3] {
        let i = (y * self.stride + x) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn is_well_formed(&self) -> bool {
        self.stride >= self.w
            && (self.h == 0 || self.data.len() >= ((self.h - 1) * self.stride + self.w) * 3)
    }

    /// Weighted luminance in `[0, 255]`.
    pub fn to_gray_f32(&self) -> ImageF32 {
        let mut out = ImageF32::new(self.w, self.h);
        for y in 0..self.h {
            let start = y * self.stride * 3;
            let src = &self.data[start..start + self.w * 3];
            let dst = out.row_mut(y);
            for (d, px) in dst.iter_mut().zip(src.chunks_exact(3)) {
                *d = LUMA_WEIGHTS[0] * px[0] as f32
                    + LUMA_WEIGHTS[1] * px[1] as f32
                    + LUMA_WEIGHTS[2] * px[2] as f32;
            }
        }
        out
    }
}
