use super::{BackendKind, NumericKernels};
use crate::spatial::Frustum;

/// Fallback backend: straight `f32` math, one element at a time.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarKernels;

impl NumericKernels for ScalarKernels {
    fn backend(&self) -> BackendKind {
        BackendKind::Fallback
    }

    fn sin_batch(&self, input: &[f32], out: &mut [f32]) {
        for (o, &x) in out.iter_mut().zip(input) {
            *o = x.sin();
        }
    }

    fn cos_batch(&self, input: &[f32], out: &mut [f32]) {
        for (o, &x) in out.iter_mut().zip(input) {
            *o = x.cos();
        }
    }

    #[inline]
    fn sin_cos(&self, x: f32) -> (f32, f32) {
        x.sin_cos()
    }

    fn cull_frustum(&self, positions: &[f32], view_projection: &[f32], margin: f32, mask: &mut [u8]) -> usize {
        let count = (positions.len() / 3).min(mask.len());
        let Some(frustum) = Frustum::from_view_projection(view_projection) else {
            mask[..count].fill(1);
            return count;
        };
        let mut visible = 0;
        for (m, p) in mask[..count].iter_mut().zip(positions.chunks_exact(3)) {
            let inside = frustum.contains(p[0], p[1], p[2], margin);
            *m = inside as u8;
            visible += inside as usize;
        }
        visible
    }
}
