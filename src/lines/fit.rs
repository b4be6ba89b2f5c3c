use serde::Serialize;

/// Least-squares segment fitted to a raw pixel chain, in working pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct FittedLine {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl FittedLine {
    pub fn new(start: [f64; 2], end: [f64; 2]) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn dx(&self) -> f64 {
        self.end[0] - self.start[0]
    }

    #[inline]
    pub fn dy(&self) -> f64 {
        self.end[1] - self.start[1]
    }

    pub fn length(&self) -> f64 {
        self.dx().hypot(self.dy())
    }

    /// Direction angle `atan2(dy, dx)`.
    pub fn angle(&self) -> f64 {
        self.dy().atan2(self.dx())
    }

    /// Smallest distance from an endpoint of either line to the other line,
    /// counting only footpoints near the other segment (parameter in
    /// `(−0.1, 1.1)`). Infinite when no footpoint qualifies.
    pub fn estimated_distance(&self, other: &FittedLine) -> f64 {
        let candidates = [
            endpoint_distance(self.start, other),
            endpoint_distance(self.end, other),
            endpoint_distance(other.start, self),
            endpoint_distance(other.end, self),
        ];
        candidates.into_iter().fold(f64::INFINITY, f64::min)
    }

    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            start: [self.start[0] * scale, self.start[1] * scale],
            end: [self.end[0] * scale, self.end[1] * scale],
        }
    }
}

fn endpoint_distance(p: [f64; 2], line: &FittedLine) -> f64 {
    let (foot, t) = footpoint(p, line.start, line.end);
    if t > -0.1 && t < 1.1 {
        (p[0] - foot[0]).hypot(p[1] - foot[1])
    } else {
        f64::INFINITY
    }
}

/// Orthogonal projection of `p` onto the line through `a` and `b`, with the
/// segment parameter `t` (`0` at `a`, `1` at `b`). A degenerate line
/// projects everything onto `a`.
pub fn footpoint(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> ([f64; 2], f64) {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len2 = dx * dx + dy * dy;
    if len2 <= f64::EPSILON {
        return (a, 0.0);
    }
    let t = ((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len2;
    ([a[0] + t * dx, a[1] + t * dy], t)
}

/// Fit `y = slope·x + offset` to the points and clip it at the footpoints of
/// the first and last point.
///
/// Chains with (almost) constant x give the vertical segment at the mean x.
/// Returns `None` for an empty chain.
pub fn fit_line(points: &[[i32; 2]]) -> Option<FittedLine> {
    let first = *points.first()?;
    let last = *points.last()?;
    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sx2) = (0.0, 0.0, 0.0, 0.0);
    for p in points {
        let (x, y) = (p[0] as f64, p[1] as f64);
        sx += x;
        sy += y;
        sxy += x * y;
        sx2 += x * x;
    }
    sx /= n;
    sy /= n;
    sxy /= n;
    sx2 /= n;

    let var_x = sx2 - sx * sx;
    if var_x.abs() < 1e-5 {
        return Some(FittedLine::new(
            [sx, first[1] as f64],
            [sx, last[1] as f64],
        ));
    }
    let slope = (sxy - sx * sy) / var_x;
    let offset = sy - slope * sx;
    let a = [0.0, offset];
    let b = [100.0, 100.0 * slope + offset];
    let (start, _) = footpoint([first[0] as f64, first[1] as f64], a, b);
    let (end, _) = footpoint([last[0] as f64, last[1] as f64], a, b);
    Some(FittedLine::new(start, end))
}
