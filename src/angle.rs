//! Angle utilities used across the detection pipeline.

/// Computes the smallest unsigned angular difference between two angles,
/// treating antipodal directions as equivalent (i.e. π apart → 0).
#[inline]
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = (a - b).abs().rem_euclid(std::f64::consts::PI);
    if diff > std::f64::consts::FRAC_PI_2 {
        std::f64::consts::PI - diff
    } else {
        diff
    }
}

/// Deviation of the direction `(dx, dy)` from the image vertical of a camera
/// rolled by `roll_deg`, as `|dx·cos(roll) + dy·sin(roll)| / |d|`.
///
/// This is the sine of the angle between the direction and the rolled
/// vertical. A zero-length direction yields NaN, which fails every `<` test.
#[inline]
pub fn vertical_deviation(dx: f64, dy: f64, roll_deg: f64) -> f64 {
    let roll = roll_deg.to_radians();
    let len = (dx * dx + dy * dy).sqrt();
    (dx * roll.cos() + dy * roll.sin()).abs() / len
}

/// Wrap an angle into `(-π, π]`.
#[inline]
pub fn wrap_pi(angle: f64) -> f64 {
    let wrapped = (angle + std::f64::consts::PI).rem_euclid(2.0 * std::f64::consts::PI)
        - std::f64::consts::PI;
    if wrapped <= -std::f64::consts::PI {
        wrapped + 2.0 * std::f64::consts::PI
    } else {
        wrapped
    }
}
