use std::f64::consts::TAU as TAU_F64;

use super::{BackendKind, NumericKernels};
use crate::core::error::{FxError, FxResult};
use crate::spatial::Frustum;

/// Table resolution; linear interpolation keeps the error near 3e-7.
const SIN_TABLE_SIZE: usize = 4096;
const QUARTER: usize = SIN_TABLE_SIZE / 4;
const INV_STEP: f64 = SIN_TABLE_SIZE as f64 / TAU_F64;
/// Self-check tolerance against f64 sine.
const SELF_CHECK_TOLERANCE: f64 = 1e-5;

/// Accelerated backend: interpolated sine table, 4-wide batch loops and,
/// on wasm32 with simd128, vectorized frustum culling.
pub struct AcceleratedKernels {
    /// One extra entry so `i + 1` never wraps.
    table: Vec<f32>,
}

impl AcceleratedKernels {
    /// Build the table and verify it; any mismatch means the caller
    /// should use the fallback.
    pub fn try_new() -> FxResult<Self> {
        let table: Vec<f32> = (0..=SIN_TABLE_SIZE)
            .map(|i| (i as f64 / SIN_TABLE_SIZE as f64 * TAU_F64).sin() as f32)
            .collect();
        let kernels = Self { table };
        kernels.self_check()?;
        Ok(kernels)
    }

    fn self_check(&self) -> FxResult<()> {
        if self.table.len() != SIN_TABLE_SIZE + 1 {
            return Err(FxError::BackendUnavailable("sine table has wrong size".into()));
        }
        const CHECK_ANGLES: [f32; 7] = [0.0, 0.5, 1.0, 2.5, -3.0, 6.0, 42.0];
        for &x in &CHECK_ANGLES {
            let (s, c) = self.sin_cos(x);
            let (es, ec) = (x as f64).sin_cos();
            if (s as f64 - es).abs() > SELF_CHECK_TOLERANCE || (c as f64 - ec).abs() > SELF_CHECK_TOLERANCE {
                return Err(FxError::BackendUnavailable(format!("sine table self-check failed at {}", x)));
            }
        }
        Ok(())
    }

    pub fn simd_enabled() -> bool {
        cfg!(all(target_arch = "wasm32", target_feature = "simd128"))
    }

    /// Table index and fraction for an angle; any finite input.
    #[inline(always)]
    fn locate(x: f32) -> (usize, f32) {
        // Reduced in f64: an f32 product loses the fraction once |x| reaches the thousands.
        let r = (x as f64 * INV_STEP).rem_euclid(SIN_TABLE_SIZE as f64);
        let i = (r as usize).min(SIN_TABLE_SIZE - 1);
        (i, (r - i as f64) as f32)
    }

    #[inline(always)]
    fn lerp_at(&self, i: usize, frac: f32) -> f32 {
        let a = self.table[i];
        let b = self.table[i + 1];
        a + (b - a) * frac
    }

    #[inline(always)]
    fn sin_one(&self, x: f32) -> f32 {
        if !x.is_finite() {
            return f32::NAN;
        }
        let (i, frac) = Self::locate(x);
        self.lerp_at(i, frac)
    }

    #[inline(always)]
    fn cos_one(&self, x: f32) -> f32 {
        if !x.is_finite() {
            return f32::NAN;
        }
        let (i, frac) = Self::locate(x);
        self.lerp_at((i + QUARTER) % SIN_TABLE_SIZE, frac)
    }
}

impl NumericKernels for AcceleratedKernels {
    fn backend(&self) -> BackendKind {
        BackendKind::Accelerated
    }

    fn sin_batch(&self, input: &[f32], out: &mut [f32]) {
        let n = input.len().min(out.len());
        let (input, out) = (&input[..n], &mut out[..n]);
        let mut in_chunks = input.chunks_exact(4);
        let mut out_chunks = out.chunks_exact_mut(4);
        for (o, x) in (&mut out_chunks).zip(&mut in_chunks) {
            o[0] = self.sin_one(x[0]);
            o[1] = self.sin_one(x[1]);
            o[2] = self.sin_one(x[2]);
            o[3] = self.sin_one(x[3]);
        }
        for (o, &x) in out_chunks.into_remainder().iter_mut().zip(in_chunks.remainder()) {
            *o = self.sin_one(x);
        }
    }

    fn cos_batch(&self, input: &[f32], out: &mut [f32]) {
        let n = input.len().min(out.len());
        let (input, out) = (&input[..n], &mut out[..n]);
        let mut in_chunks = input.chunks_exact(4);
        let mut out_chunks = out.chunks_exact_mut(4);
        for (o, x) in (&mut out_chunks).zip(&mut in_chunks) {
            o[0] = self.cos_one(x[0]);
            o[1] = self.cos_one(x[1]);
            o[2] = self.cos_one(x[2]);
            o[3] = self.cos_one(x[3]);
        }
        for (o, &x) in out_chunks.into_remainder().iter_mut().zip(in_chunks.remainder()) {
            *o = self.cos_one(x);
        }
    }

    #[inline]
    fn sin_cos(&self, x: f32) -> (f32, f32) {
        if !x.is_finite() {
            return (f32::NAN, f32::NAN);
        }
        let (i, frac) = Self::locate(x);
        (self.lerp_at(i, frac), self.lerp_at((i + QUARTER) % SIN_TABLE_SIZE, frac))
    }

    fn cull_frustum(&self, positions: &[f32], view_projection: &[f32], margin: f32, mask: &mut [u8]) -> usize {
        let count = (positions.len() / 3).min(mask.len());
        let Some(frustum) = Frustum::from_view_projection(view_projection) else {
            mask[..count].fill(1);
            return count;
        };

        #[cfg(all(target_arch = "wasm32", target_feature = "simd128"))]
        {
            // SAFETY: simd128 is enabled for this build; slices are bounded by `count`.
            unsafe { super::accelerated_wasm32::cull_frustum_simd(&frustum, &positions[..count * 3], margin, &mut mask[..count]) }
        }

        #[cfg(not(all(target_arch = "wasm32", target_feature = "simd128")))]
        {
            let planes = &frustum.planes;
            let mut visible = 0;
            for (m, p) in mask[..count].iter_mut().zip(positions.chunks_exact(3)) {
                let (x, y, z) = (p[0], p[1], p[2]);
                let inside = planes
                    .iter()
                    .all(|pl| pl[0] * x + pl[1] * y + pl[2] * z + pl[3] >= -margin);
                *m = inside as u8;
                visible += inside as usize;
            }
            visible
        }
    }
}
