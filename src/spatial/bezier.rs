//! Precomputed Bezier trajectories
//!
//! A path is sampled once when its owner spawns; per-frame motion is a
//! lookup plus one lerp between the two bracketing samples.

use crate::core::math::Vec2;

/// Quadratic Bezier B(t) = (1-t)^2 P0 + 2(1-t)t C + t^2 P1
#[inline]
fn quadratic(p0: Vec2, control: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let uu = u * u;
    let ut2 = 2.0 * u * t;
    let tt = t * t;
    Vec2::new(
        uu * p0.x + ut2 * control.x + tt * p1.x,
        uu * p0.y + ut2 * control.y + tt * p1.y,
    )
}

/// Cubic Bezier B(t) = (1-t)^3 P0 + 3(1-t)^2 t C1 + 3(1-t) t^2 C2 + t^3 P1
#[inline]
fn cubic(p0: Vec2, c1: Vec2, c2: Vec2, p1: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;
    let a = uu * u;
    let b = 3.0 * uu * t;
    let c = 3.0 * u * tt;
    let d = tt * t;
    Vec2::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}

/// `segments + 1` samples from start to end. Zero segments is treated as one.
pub fn calculate_bezier_path(p0: Vec2, control: Vec2, p1: Vec2, segments: usize) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(segments.max(1) + 1);
    fill_quadratic(&mut points, p0, control, p1, segments);
    points
}

pub fn calculate_cubic_bezier_path(
    p0: Vec2,
    c1: Vec2,
    c2: Vec2,
    p1: Vec2,
    segments: usize,
) -> Vec<Vec2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| cubic(p0, c1, c2, p1, i as f32 / segments as f32))
        .collect()
}

fn fill_quadratic(out: &mut Vec<Vec2>, p0: Vec2, control: Vec2, p1: Vec2, segments: usize) {
    let segments = segments.max(1);
    out.clear();
    for i in 0..=segments {
        out.push(quadratic(p0, control, p1, i as f32 / segments as f32));
    }
}

/// Point at progress `t` by lerping the two bracketing samples.
/// t <= 0 (or NaN) is the first sample, t >= 1 the last, both exact.
pub fn interpolate_point(path: &[Vec2], t: f32) -> Vec2 {
    let n = path.len();
    if n == 0 {
        return Vec2::zero();
    }
    if t.is_nan() || t <= 0.0 || n == 1 {
        return path[0];
    }
    if t >= 1.0 {
        return path[n - 1];
    }

    let f = t * (n - 1) as f32;
    let i = f.floor() as usize;
    if i >= n - 1 {
        return path[n - 1];
    }
    path[i].lerp(path[i + 1], f - i as f32)
}

/// Polyline length of the sampled path.
pub fn path_length(path: &[Vec2]) -> f32 {
    path.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Batch variant over flattened `[sx, sy, cx, cy, ex, ey]` records;
/// output is flattened x,y pairs, `segments + 1` per path.
pub fn calculate_bezier_paths_batch(paths_data: &[f32], segments: usize) -> Vec<f32> {
    let segments = segments.max(1);
    let path_count = paths_data.len() / 6;
    let mut out = Vec::with_capacity(path_count * (segments + 1) * 2);
    for rec in paths_data.chunks_exact(6) {
        let p0 = Vec2::new(rec[0], rec[1]);
        let c = Vec2::new(rec[2], rec[3]);
        let p1 = Vec2::new(rec[4], rec[5]);
        for i in 0..=segments {
            let p = quadratic(p0, c, p1, i as f32 / segments as f32);
            out.push(p.x);
            out.push(p.y);
        }
    }
    out
}

/// Immutable sampled trajectory owned by one entity. `respawn` replaces
/// every sample at once, reusing the allocation.
#[derive(Clone, Debug, Default)]
pub struct BezierPath {
    points: Vec<Vec2>,
    length: f32,
}

impl BezierPath {
    pub fn quadratic(p0: Vec2, control: Vec2, p1: Vec2, segments: usize) -> Self {
        let mut path = Self { points: Vec::with_capacity(segments.max(1) + 1), length: 0.0 };
        path.respawn(p0, control, p1, segments);
        path
    }

    pub fn respawn(&mut self, p0: Vec2, control: Vec2, p1: Vec2, segments: usize) {
        fill_quadratic(&mut self.points, p0, control, p1, segments);
        self.length = path_length(&self.points);
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.length = 0.0;
    }

    #[inline]
    pub fn point_at(&self, t: f32) -> Vec2 {
        interpolate_point(&self.points, t)
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start(&self) -> Option<Vec2> {
        self.points.first().copied()
    }

    pub fn end(&self) -> Option<Vec2> {
        self.points.last().copied()
    }
}
