//! Numeric kernel table
//!
//! Batch math used by the per-frame code: sin/cos batches, star
//! generation, frustum culling, speed/rotation smoothing. Two backends
//! implement the same trait:
//! - `AcceleratedKernels`: interpolated sine table, 4-wide loops, wasm32
//!   simd128 culling when the target feature is on
//! - `ScalarKernels`: plain `f32` math, always available
//!
//! The backend is chosen once by `get_optimized_functions`; callers only
//! ever see `&dyn NumericKernels`.

mod accelerated;
mod accelerated_wasm32;
mod scalar;

pub use accelerated::AcceleratedKernels;
pub use scalar::ScalarKernels;

use std::f32::consts::TAU;

use crate::core::random::hash01;
use crate::domain::config::BackendConfig;

/// Click boost fades over this window (ms).
pub const CLICK_BOOST_MS: f64 = 1200.0;
pub const MOVE_BOOST: f32 = 4.5;
pub const CLICK_BOOST: f32 = 4.3;
pub const SPEED_SMOOTHING: f32 = 0.2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendKind {
    Accelerated,
    Fallback,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Accelerated => "accelerated",
            BackendKind::Fallback => "fallback",
        }
    }
}

// Independent hash streams per generated attribute.
const STREAM_RADIUS: u32 = 0;
const STREAM_THETA: u32 = 1;
const STREAM_PHI: u32 = 2;
const STREAM_COLOR: u32 = 3;
const STREAM_SIZE_CLASS: u32 = 4;
const STREAM_SIZE_SMALL: u32 = 5;
const STREAM_SIZE_LARGE: u32 = 6;

#[inline]
fn star_hash(index: u32, stream: u32) -> f32 {
    hash01(index.wrapping_add(stream.wrapping_mul(1_000_003)))
}

pub trait NumericKernels {
    fn backend(&self) -> BackendKind;

    /// `out[i] = sin(input[i])` for the overlapping length.
    fn sin_batch(&self, input: &[f32], out: &mut [f32]);

    fn cos_batch(&self, input: &[f32], out: &mut [f32]);

    fn sin_cos(&self, x: f32) -> (f32, f32);

    /// Fill `mask` (1 visible, 0 culled) for xyz-interleaved `positions`.
    /// A matrix that is not 4x4 marks everything visible. Returns the
    /// visible count.
    fn cull_frustum(&self, positions: &[f32], view_projection: &[f32], margin: f32, mask: &mut [u8])
        -> usize;

    // === Provided kernels (identical math on both backends) ===

    /// Indices `cull_frustum` keeps, in order. `mask` is caller scratch so
    /// per-frame culling does not allocate.
    fn visible_indices(
        &self,
        positions: &[f32],
        view_projection: &[f32],
        margin: f32,
        mask: &mut Vec<u8>,
        out: &mut Vec<u32>,
    ) {
        mask.clear();
        mask.resize(positions.len() / 3, 0);
        let visible = self.cull_frustum(positions, view_projection, margin, mask);
        out.clear();
        out.reserve(visible);
        out.extend(mask.iter().enumerate().filter(|&(_, &m)| m != 0).map(|(i, _)| i as u32));
    }

    /// Points on a spherical shell, xyz-interleaved, appended to `out`.
    fn generate_star_positions(
        &self,
        count: usize,
        start_index: usize,
        min_radius: f32,
        max_radius: f32,
        out: &mut Vec<f32>,
    ) {
        out.reserve(count * 3);
        for i in 0..count {
            let g = (start_index + i) as u32;
            let radius = min_radius + star_hash(g, STREAM_RADIUS) * (max_radius - min_radius);
            let theta = star_hash(g, STREAM_THETA) * TAU;
            let cos_phi = 2.0 * star_hash(g, STREAM_PHI) - 1.0;
            let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();
            let (sin_t, cos_t) = self.sin_cos(theta);
            out.push(radius * sin_phi * cos_t);
            out.push(radius * sin_phi * sin_t);
            out.push(radius * cos_phi);
        }
    }

    /// RGB in 0..1, white/blue/yellow/purple at 50/20/15/15 %.
    fn generate_star_colors(&self, count: usize, start_index: usize, out: &mut Vec<f32>) {
        out.reserve(count * 3);
        for i in 0..count {
            let choice = star_hash((start_index + i) as u32, STREAM_COLOR);
            let rgb = if choice < 0.5 {
                [1.0, 1.0, 1.0]
            } else if choice < 0.7 {
                [0.6, 0.8, 1.0]
            } else if choice < 0.85 {
                [1.0, 0.8, 0.4]
            } else {
                [0.8, 0.6, 1.0]
            };
            out.extend_from_slice(&rgb);
        }
    }

    /// 70 % small (1..2.5), 30 % large (2.5..4.5), scaled.
    fn generate_star_sizes(&self, count: usize, start_index: usize, size_multiplier: f32, out: &mut Vec<f32>) {
        out.reserve(count);
        for i in 0..count {
            let g = (start_index + i) as u32;
            let base = if star_hash(g, STREAM_SIZE_CLASS) < 0.7 {
                1.0 + star_hash(g, STREAM_SIZE_SMALL) * 1.5
            } else {
                2.5 + star_hash(g, STREAM_SIZE_LARGE) * 2.0
            };
            out.push(base * size_multiplier);
        }
    }

    /// Target multiplier from input state, eased towards from `current`.
    fn calculate_speed_multiplier(&self, is_moving: bool, click_time: f64, current_time: f64, current: f32) -> f32 {
        let mut target = 1.0;
        if is_moving {
            target *= MOVE_BOOST;
        }
        let since_click = current_time - click_time;
        if (0.0..CLICK_BOOST_MS).contains(&since_click) {
            let decay = 1.0 - (since_click / CLICK_BOOST_MS) as f32;
            target *= 1.0 + CLICK_BOOST * decay;
        }
        current + (target - current) * SPEED_SMOOTHING
    }

    fn calculate_rotation_delta(&self, base_x: f32, base_y: f32, speed_multiplier: f32, delta_time: f32) -> (f32, f32) {
        (
            base_x * speed_multiplier * delta_time,
            base_y * speed_multiplier * delta_time,
        )
    }

    /// `[near, mid, far]` counts; far takes the remainder.
    fn lod_distribution(&self, total: usize, near_ratio: f32, mid_ratio: f32) -> [u32; 3] {
        let near = (total as f32 * near_ratio.clamp(0.0, 1.0)).floor() as u32;
        let mid = ((total as f32 * mid_ratio.clamp(0.0, 1.0)).floor() as u32).min(total as u32 - near);
        [near, mid, total as u32 - near - mid]
    }
}

/// A selected backend plus why, if it is the fallback.
pub struct KernelTable {
    kernels: Box<dyn NumericKernels>,
    fallback_reason: Option<String>,
}

impl KernelTable {
    pub fn accelerated(kernels: AcceleratedKernels) -> Self {
        Self { kernels: Box::new(kernels), fallback_reason: None }
    }

    pub fn fallback(reason: impl Into<String>) -> Self {
        Self { kernels: Box::new(ScalarKernels), fallback_reason: Some(reason.into()) }
    }

    #[inline]
    pub fn kernels(&self) -> &dyn NumericKernels {
        self.kernels.as_ref()
    }

    pub fn backend(&self) -> BackendKind {
        self.kernels.backend()
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        self.fallback_reason.as_deref()
    }
}

/// Best-effort load: accelerated if it builds and passes its self-check,
/// otherwise the scalar table. Never fails.
pub fn get_optimized_functions(config: &BackendConfig) -> KernelTable {
    if !config.prefer_accelerated {
        fx_log!("numeric backend: fallback (disabled by config)");
        return KernelTable::fallback("disabled by config");
    }
    match AcceleratedKernels::try_new() {
        Ok(kernels) => {
            fx_log!(
                "numeric backend: accelerated (simd128: {})",
                AcceleratedKernels::simd_enabled()
            );
            KernelTable::accelerated(kernels)
        }
        Err(e) => {
            fx_warn!("numeric backend: fallback ({})", e);
            KernelTable::fallback(e.to_string())
        }
    }
}

/// Load state: not loaded until first use, then accelerated or fallback
/// for the rest of its life.
#[derive(Default)]
pub struct KernelSlot {
    table: Option<KernelTable>,
}

impl KernelSlot {
    pub fn get_or_load(&mut self, config: &BackendConfig) -> &KernelTable {
        self.table.get_or_insert_with(|| get_optimized_functions(config))
    }

    pub fn table(&self) -> Option<&KernelTable> {
        self.table.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
