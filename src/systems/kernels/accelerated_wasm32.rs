#![cfg(all(target_arch = "wasm32", target_feature = "simd128"))]

use crate::spatial::Frustum;

/// Four stars per iteration: plane distances are evaluated lane-wise and
/// the per-plane "inside" masks are AND-ed together.
pub(super) unsafe fn cull_frustum_simd(frustum: &Frustum, positions: &[f32], margin: f32, mask: &mut [u8]) -> usize {
    use std::arch::wasm32::*;

    let count = mask.len();
    let v_neg_margin = f32x4_splat(-margin);
    let mut visible = 0usize;
    let mut i = 0usize;

    while i + 4 <= count {
        let b = i * 3;
        let xs = f32x4(positions[b], positions[b + 3], positions[b + 6], positions[b + 9]);
        let ys = f32x4(positions[b + 1], positions[b + 4], positions[b + 7], positions[b + 10]);
        let zs = f32x4(positions[b + 2], positions[b + 5], positions[b + 8], positions[b + 11]);

        let mut inside = u32x4_splat(u32::MAX);
        for p in &frustum.planes {
            let d = f32x4_add(
                f32x4_add(f32x4_mul(xs, f32x4_splat(p[0])), f32x4_mul(ys, f32x4_splat(p[1]))),
                f32x4_add(f32x4_mul(zs, f32x4_splat(p[2])), f32x4_splat(p[3])),
            );
            inside = v128_and(inside, f32x4_ge(d, v_neg_margin));
        }

        let lanes = [
            u32x4_extract_lane::<0>(inside) != 0,
            u32x4_extract_lane::<1>(inside) != 0,
            u32x4_extract_lane::<2>(inside) != 0,
            u32x4_extract_lane::<3>(inside) != 0,
        ];
        for (k, &lane) in lanes.iter().enumerate() {
            mask[i + k] = lane as u8;
            visible += lane as usize;
        }
        i += 4;
    }

    // Scalar remainder
    while i < count {
        let b = i * 3;
        let inside = frustum.contains(positions[b], positions[b + 1], positions[b + 2], margin);
        mask[i] = inside as u8;
        visible += inside as usize;
        i += 1;
    }

    visible
}
