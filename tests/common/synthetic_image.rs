use vertical_lines::lens::SrcImage;

/// Dark left part, bright right part, split at column `split_x`.
pub fn vertical_step_u8(width: usize, height: usize, split_x: usize) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![40u8; width * height];
    for y in 0..height {
        for x in split_x.min(width)..width {
            img[y * width + x] = 210;
        }
    }
    img
}

/// Full-height bright stripes `[x0, x1)` on a dark background.
pub fn vertical_stripes_u8(width: usize, height: usize, stripes: &[(usize, usize)]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![40u8; width * height];
    for &(x0, x1) in stripes {
        for y in 0..height {
            for x in x0.min(width)..x1.min(width) {
                img[y * width + x] = 210;
            }
        }
    }
    img
}

/// Bright stripes `[x0, x1)` whose columns shift by `slope` pixels per row.
pub fn slanted_stripes_u8(width: usize, height: usize, stripes: &[(f64, f64, f64)]) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut img = vec![40u8; width * height];
    for &(x0, x1, slope) in stripes {
        for y in 0..height {
            let shift = slope * y as f64;
            for x in 0..width {
                let xf = x as f64;
                if xf >= x0 + shift && xf < x1 + shift {
                    img[y * width + x] = 210;
                }
            }
        }
    }
    img
}

/// Render scene verticals (bright bands around the given longitudes) as seen
/// through `lens`. Pixels without a ray stay dark.
pub fn lens_stripes_u8(lens: &SrcImage, lon_deg: &[f64], half_width_deg: f64) -> Vec<u8> {
    let bands: Vec<(f64, f64)> = lon_deg.iter().map(|&l| (l, 0.0)).collect();
    lens_bands_u8(lens, &bands, half_width_deg)
}

/// Bands `(lon_deg, slope)` centred on `lon_deg + slope · lat_deg`; a slope
/// of 0 is a scene vertical, anything else a tilted scene line.
pub fn lens_bands_u8(lens: &SrcImage, bands: &[(f64, f64)], half_width_deg: f64) -> Vec<u8> {
    let (w, h) = (lens.width, lens.height);
    let mut img = vec![40u8; w * h];
    for y in 0..h {
        for x in 0..w {
            let Some(ray) = lens.image_to_pano_ray(x as f64, y as f64) else {
                continue;
            };
            let lon = ray.x.atan2(ray.z).to_degrees();
            let lat = ray.y.clamp(-1.0, 1.0).asin().to_degrees();
            if bands
                .iter()
                .any(|&(l, slope)| (lon - (l + slope * lat)).abs() < half_width_deg)
            {
                img[y * w + x] = 210;
            }
        }
    }
    img
}
