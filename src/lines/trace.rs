//! Edge tracing: junction-free pixel chains split into straight pieces.
//!
//! 1. Staircase corners that do not carry connectivity are thinned away so a
//!    digital line is a simple 8-connected chain.
//! 2. Pixels with three or more neighbours (junctions) are removed, leaving
//!    every component a path or a loop.
//! 3. Paths are walked from their raster-first endpoint, loops from their
//!    raster-first pixel.
//! 4. Each chain is split at its farthest pixel from the chord while that
//!    deviation exceeds the allowed sagitta; pieces shorter than the minimum
//!    are dropped, the rest tagged by straightness.
//!
//! All scans run in raster order, so the output is deterministic.
use super::types::{LineStatus, RawLine, TraceOptions};
use crate::edges::EdgeMask;

const NEIGH_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Ring order around a pixel, used for the simple-point test.
const RING: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
];

struct Grid {
    w: usize,
    h: usize,
    on: Vec<bool>,
}

impl Grid {
    fn from_mask(edge: &EdgeMask) -> Self {
        let (w, h) = (edge.width(), edge.height());
        let mut on = vec![false; w * h];
        for y in 0..h {
            for x in 0..w {
                on[y * w + x] = edge.is_edge(x, y);
            }
        }
        Self { w, h, on }
    }

    #[inline]
    fn at(&self, x: isize, y: isize) -> bool {
        x >= 0
            && y >= 0
            && (x as usize) < self.w
            && (y as usize) < self.h
            && self.on[y as usize * self.w + x as usize]
    }

    fn neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let x = (idx % self.w) as isize;
        let y = (idx / self.w) as isize;
        NEIGH_OFFSETS.iter().filter_map(move |&(dx, dy)| {
            let (nx, ny) = (x + dx, y + dy);
            self.at(nx, ny).then(|| ny as usize * self.w + nx as usize)
        })
    }

    fn degree(&self, idx: usize) -> usize {
        self.neighbours(idx).count()
    }

    /// Remove corner pixels whose neighbours stay connected without them.
    fn thin_corners(&mut self) {
        for idx in 0..self.on.len() {
            if !self.on[idx] {
                continue;
            }
            let x = (idx % self.w) as isize;
            let y = (idx / self.w) as isize;
            let ring: Vec<bool> = RING.iter().map(|&(dx, dy)| self.at(x + dx, y + dy)).collect();
            let count = ring.iter().filter(|&&b| b).count();
            if count < 2 {
                continue;
            }
            // orthogonal pairs: N+E, E+S, S+W, W+N
            let (n, e, s, wst) = (ring[1], ring[3], ring[5], ring[7]);
            let corner = (n && e) || (e && s) || (s && wst) || (wst && n);
            if corner && ring_components(&ring) == 1 {
                self.on[idx] = false;
            }
        }
    }

    fn remove_junctions(&mut self) {
        let junctions: Vec<usize> = (0..self.on.len())
            .filter(|&idx| self.on[idx] && self.degree(idx) >= 3)
            .collect();
        for idx in junctions {
            self.on[idx] = false;
        }
    }

    fn point(&self, idx: usize) -> [i32; 2] {
        [(idx % self.w) as i32, (idx / self.w) as i32]
    }

    fn walk(&self, start: usize, visited: &mut [bool]) -> Vec<[i32; 2]> {
        let mut chain = Vec::new();
        let mut current = Some(start);
        while let Some(idx) = current {
            visited[idx] = true;
            chain.push(self.point(idx));
            current = self.neighbours(idx).find(|&n| !visited[n]);
        }
        chain
    }

    fn chains(&self) -> Vec<Vec<[i32; 2]>> {
        let mut visited = vec![false; self.on.len()];
        let mut chains = Vec::new();
        for idx in 0..self.on.len() {
            if self.on[idx] && !visited[idx] && self.degree(idx) == 1 {
                chains.push(self.walk(idx, &mut visited));
            }
        }
        for idx in 0..self.on.len() {
            if self.on[idx] && !visited[idx] && self.degree(idx) == 2 {
                chains.push(self.walk(idx, &mut visited));
            }
        }
        chains
    }
}

/// Number of 8-connected runs of set cells in a 3×3 ring (centre excluded).
fn ring_components(ring: &[bool]) -> usize {
    let n = ring.len();
    let mut label = vec![usize::MAX; n];
    let mut components = 0;
    for start in 0..n {
        if !ring[start] || label[start] != usize::MAX {
            continue;
        }
        let mut stack = vec![start];
        label[start] = components;
        while let Some(i) = stack.pop() {
            for j in 0..n {
                if ring[j] && label[j] == usize::MAX && ring_adjacent(i, j) {
                    label[j] = components;
                    stack.push(j);
                }
            }
        }
        components += 1;
    }
    components
}

fn ring_adjacent(i: usize, j: usize) -> bool {
    let (ax, ay) = RING[i];
    let (bx, by) = RING[j];
    i != j && (ax - bx).abs() <= 1 && (ay - by).abs() <= 1
}

/// Trace `edge` into raw lines of at least `min_points` pixels.
///
/// `focal_px` widens the split tolerance for long pieces; pass 0 to use the
/// fixed tolerance only.
pub fn trace_lines(
    edge: &EdgeMask,
    min_points: usize,
    focal_px: f64,
    options: &TraceOptions,
) -> Vec<RawLine> {
    let mut grid = Grid::from_mask(edge);
    grid.thin_corners();
    grid.remove_junctions();

    let radius = if focal_px.is_finite() && focal_px > 0.0 {
        Some(focal_px * options.curvature_radius_factor)
    } else {
        None
    };

    let mut lines = Vec::new();
    for chain in grid.chains() {
        for piece in split_chain(&chain, options.split_tolerance_px, radius) {
            if piece.len() < min_points.max(2) {
                continue;
            }
            let mut line = RawLine::new(piece.to_vec(), LineStatus::Valid);
            if line.straightness() < options.min_straightness {
                line.status = LineStatus::Rejected;
            }
            lines.push(line);
        }
    }
    lines
}

/// Split a chain into pieces that stay within the sagitta allowance.
fn split_chain(
    chain: &[[i32; 2]],
    tolerance: f64,
    radius: Option<f64>,
) -> Vec<&[[i32; 2]]> {
    let mut pieces = Vec::new();
    let mut stack = vec![(0usize, chain.len())];
    while let Some((start, end)) = stack.pop() {
        let piece = &chain[start..end];
        if piece.len() < 3 {
            pieces.push((start, piece));
            continue;
        }
        let (k, deviation, chord) = farthest_from_chord(piece);
        let allowed = match radius {
            Some(r) => tolerance.max(chord * chord / (8.0 * r)),
            None => tolerance,
        };
        if deviation > allowed && k > 0 && k + 1 < piece.len() {
            // push the tail first so pieces come out in chain order
            stack.push((start + k, end));
            stack.push((start, start + k + 1));
        } else {
            pieces.push((start, piece));
        }
    }
    pieces.sort_by_key(|&(start, _)| start);
    pieces.into_iter().map(|(_, p)| p).collect()
}

/// Index, distance and chord length of the pixel farthest from the chord.
fn farthest_from_chord(piece: &[[i32; 2]]) -> (usize, f64, f64) {
    let a = piece[0];
    let b = piece[piece.len() - 1];
    let dx = (b[0] - a[0]) as f64;
    let dy = (b[1] - a[1]) as f64;
    let chord = (dx * dx + dy * dy).sqrt();
    let mut best = (0usize, 0.0f64);
    for (i, p) in piece.iter().enumerate() {
        let px = (p[0] - a[0]) as f64;
        let py = (p[1] - a[1]) as f64;
        let d = if chord > 0.0 {
            (px * dy - py * dx).abs() / chord
        } else {
            (px * px + py * py).sqrt()
        };
        if d > best.1 {
            best = (i, d);
        }
    }
    (best.0, best.1, chord)
}
