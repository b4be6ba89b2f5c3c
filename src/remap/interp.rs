use crate::image::ImageF32;

/// Catmull-Rom weights for the four taps around a fractional offset `t`.
#[inline]
fn catmull_rom_weights(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

/// Bicubic (Catmull-Rom) sample of `img` at `(x, y)` with replicated borders.
pub fn sample_cubic(img: &ImageF32, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = catmull_rom_weights((x - x0) as f32);
    let wy = catmull_rom_weights((y - y0) as f32);
    let (xi, yi) = (x0 as isize, y0 as isize);
    let mut acc = 0.0f32;
    for (j, wyj) in wy.iter().enumerate() {
        let yy = yi + j as isize - 1;
        let mut row = 0.0f32;
        for (i, wxi) in wx.iter().enumerate() {
            row += wxi * img.get_clamped(xi + i as isize - 1, yy);
        }
        acc += wyj * row;
    }
    acc
}
